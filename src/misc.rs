use std::env;
use std::path::Path;

/// The name of the running program: the file name of `argv[0]`.
///
/// Falls back to `"rust"` when the process was started without arguments.
pub fn program_name() -> String {
    env::args_os()
        .next()
        .as_ref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rust".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_name_is_not_a_path() {
        let name = program_name();
        assert!(!name.is_empty());
        assert!(!name.contains('/'));
    }
}
