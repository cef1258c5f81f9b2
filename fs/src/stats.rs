//! File store statistics surfaced to the shell's `/fsstat` command (spec §4.6).

#[derive(Clone, Copy, Debug, Default)]
pub struct FsStats {
    pub total_files: u32,
    pub used_files: u32,
    pub open_files: u32,
    pub total_space: u64,
    pub used_space: u64,
    pub free_space: u64,
}
