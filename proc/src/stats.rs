//! Process/thread statistics surfaced to the shell's `/procstat` command
//! (spec §4.6).

#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessStats {
    pub total_processes: u32,
    pub running_processes: u32,
    pub ready_processes: u32,
    pub blocked_processes: u32,
    pub terminated_processes: u32,
    pub total_threads: u32,
    pub ready_threads: u32,
    pub running_threads: u32,
}
