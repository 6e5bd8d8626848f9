pub mod progress_file;
pub mod scene_mq;
pub mod seed;

/// HUD status line for the current run.
pub fn status_line(seed: u64, completed: usize, total: usize) -> String {
    format!("seed {seed}  |  rooms cleared {completed}/{total}")
}
