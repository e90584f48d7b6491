/// Resource naming - one fresh container name and output file per invocation
/// Random suffixes keep concurrent or leftover runs on the same Docker host
/// from colliding; nothing else coordinates them.

pub const CONTAINER_PREFIX: &str = "ansible-test";
pub const OUTPUT_PREFIX: &str = "output";

/// Container name for a given 64-bit suffix
pub fn container_name(suffix: u64) -> String {
    format!("{}-{}", CONTAINER_PREFIX, suffix)
}

/// Result file name for a given 32-bit suffix
pub fn output_filename(suffix: u32) -> String {
    format!("{}-{}.json", OUTPUT_PREFIX, suffix)
}

/// Names scoped to a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunNames {
    pub container: String,
    pub output_file: String,
}

impl RunNames {
    /// Generate a fresh pair of names
    pub fn generate() -> Self {
        Self {
            container: container_name(rand::random::<u64>()),
            output_file: output_filename(rand::random::<u32>()),
        }
    }
}
