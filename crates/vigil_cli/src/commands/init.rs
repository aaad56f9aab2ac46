//! Init command implementation

use std::path::Path;

use miette::{IntoDiagnostic, Result};
use tracing::info;
use vigil_config::CONFIG_FILE;

const STARTER_CONFIG: &str = r#"# Rule sets to run against this workspace.
rulesets:
  - python-security

# Rules to skip, per rule set. A bare rule name is ignored everywhere;
# a rule with prefixes is only ignored below those paths.
# ignore:
#   - python-security:
#       - no-eval
#       - no-exec:
#           - prefix: tests/
"#;

pub fn run_init(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    loop {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NOFOLLOW);
        }

        match options.open(&config_path) {
            Ok(mut file) => {
                use std::io::Write;
                file.write_all(STARTER_CONFIG.as_bytes()).into_diagnostic()?;
                info!("Created {}", config_path.display());
                println!("Created {}", config_path.display());
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !force {
                    return Err(miette::miette!(
                        "{} already exists. Use --force to overwrite.",
                        CONFIG_FILE
                    ));
                }

                match std::fs::remove_file(&config_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_diagnostic(),
                }
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    }
}
