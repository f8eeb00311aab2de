use crate::app_state::Highlight;
use crate::gpu::info::GpuInfo;
use crate::utils::formatting::bytes_to_mib;
use std::fmt::Write;

const SPACER: &str = "   ";
const SELECTED: &str = "\x1b[31m";
const CLEAR: &str = "\x1b[0m";
const UNDERLINE: char = '-';

const ID_WIDTH: usize = 3;
const NAME_MIN_WIDTH: usize = 4;
const UTIL_WIDTH: usize = 3;
const MEMORY_WIDTH: usize = 8;
const IN_USE_WIDTH: usize = 6;
const USER_MIN_WIDTH: usize = 4;
const PROCESS_MIN_WIDTH: usize = 7;

/// Renders the GPU table and the process table, separated by a blank line.
pub fn render(gpu_infos: &[GpuInfo], highlight: &Highlight) -> String {
    let mut out = String::new();
    render_gpu_info(&mut out, gpu_infos, highlight);
    out.push('\n');
    render_process_list(&mut out, gpu_infos, highlight);
    out
}

fn dashes(width: usize) -> String {
    std::iter::repeat(UNDERLINE).take(width).collect()
}

fn push_row(out: &mut String, row: String, highlighted: bool) {
    if highlighted {
        let _ = writeln!(out, "{SELECTED}{row}{CLEAR}");
    } else {
        out.push_str(&row);
        out.push('\n');
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, floor: usize) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0).max(floor)
}

pub fn render_gpu_info(out: &mut String, gpu_infos: &[GpuInfo], highlight: &Highlight) {
    let name_width = column_width(gpu_infos.iter().map(|info| info.name.as_str()), NAME_MIN_WIDTH);
    // Unit suffixes widen the value columns.
    let util_width = UTIL_WIDTH + 1;
    let memory_width = MEMORY_WIDTH + 4;

    let _ = writeln!(
        out,
        "{:ID_WIDTH$}{SPACER}{:name_width$}{SPACER}{:util_width$}{SPACER}{:memory_width$}{SPACER}{:memory_width$}{SPACER}{:IN_USE_WIDTH$}",
        "GPU", "Name", "Util", "Memory Usage", "Memory Total", "In Use"
    );
    let _ = writeln!(
        out,
        "{}{SPACER}{}{SPACER}{}{SPACER}{}{SPACER}{}{SPACER}{}",
        dashes(ID_WIDTH),
        dashes(name_width),
        dashes(util_width),
        dashes(memory_width),
        dashes(memory_width),
        dashes(IN_USE_WIDTH)
    );

    for info in gpu_infos {
        let row = format!(
            "{:>ID_WIDTH$}{SPACER}{:<name_width$}{SPACER}{:>UTIL_WIDTH$}%{SPACER}{:>MEMORY_WIDTH$} MiB{SPACER}{:>MEMORY_WIDTH$} MiB{SPACER}{:>IN_USE_WIDTH$}",
            info.index,
            info.name,
            info.utilization,
            bytes_to_mib(info.memory_used),
            bytes_to_mib(info.memory_total),
            if info.in_use() { "Yes" } else { "No" }
        );
        push_row(out, row, highlight.matches(info));
    }
}

pub fn render_process_list(out: &mut String, gpu_infos: &[GpuInfo], highlight: &Highlight) {
    let processes = || gpu_infos.iter().flat_map(|info| info.processes.iter());
    let user_width = column_width(processes().map(|p| p.owner.display_name()), USER_MIN_WIDTH);
    let process_width = column_width(processes().map(|p| p.name.as_str()), PROCESS_MIN_WIDTH);

    let _ = writeln!(out, "{:user_width$}{SPACER}{:ID_WIDTH$}{SPACER}Process", "User", "GPU");
    let _ = writeln!(
        out,
        "{}{SPACER}{}{SPACER}{}",
        dashes(user_width),
        dashes(ID_WIDTH),
        dashes(process_width)
    );

    for info in gpu_infos {
        let highlighted = highlight.matches(info);
        for process in &info.processes {
            let row = format!(
                "{:<user_width$}{SPACER}{:>ID_WIDTH$}{SPACER}{}",
                process.owner.display_name(),
                info.index,
                process.name
            );
            push_row(out, row, highlighted);
        }
    }
}
