use std::path::PathBuf;

/// Boolean probe of the backup destination.
///
/// Expected to return quickly; a hang here stalls one tick, nothing more.
pub trait DestinationProbe: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// Filesystem existence check — covers local paths and mounted network
/// volumes, which disappear from the filesystem when the mount drops.
pub struct PathProbe {
    path: PathBuf,
}

impl PathProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DestinationProbe for PathProbe {
    fn is_reachable(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_path_is_reachable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PathProbe::new(dir.path()).is_reachable());
        assert!(!PathProbe::new(dir.path().join("missing")).is_reachable());
    }
}
