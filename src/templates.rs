//! Placeholder substitution for scanner and runtime config files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::settings::{DB_PLACEHOLDERS, Secrets};

/// Replace every placeholder in `source` and write the result to `dest`
pub fn render_file(source: &Path, dest: &Path, replacements: &[(&str, &str)]) -> Result<()> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read template {:?}", source))?;
    let rendered = replacements
        .iter()
        .fold(text, |acc, (from, to)| acc.replace(from, to));
    std::fs::write(dest, rendered).with_context(|| format!("Failed to write {:?}", dest))
}

/// Fill the database placeholders of a runtime config file into `<file>.updated`
pub fn render_db_config(file: &Path, secrets: &Secrets) -> Result<PathBuf> {
    let mut replacements = Vec::with_capacity(DB_PLACEHOLDERS.len());
    for (placeholder, key) in DB_PLACEHOLDERS {
        replacements.push((placeholder, secrets.require(key)?));
    }

    let mut dest = file.as_os_str().to_owned();
    dest.push(".updated");
    let dest = PathBuf::from(dest);
    render_file(file, &dest, &replacements)?;
    tracing::debug!("Rendered {:?}", dest);
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_secrets() -> Secrets {
        Secrets::from_lookup(|key| match key {
            "DB_HOST" => Some("db.local".to_string()),
            "DB_PORT" => Some("50000".to_string()),
            "DB_NAME" => Some("OMDB".to_string()),
            "DB_USER" => Some("db2inst1".to_string()),
            "DB_PASS" => Some("pw".to_string()),
            "DB_SCHEMA" => Some("OMS".to_string()),
            _ => None,
        })
    }

    #[test]
    fn test_render_file_replaces_all_occurrences() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let src = dir.path().join("appscan-config.xml");
        std::fs::write(&src, "<Target path=\"PROJECT_PATH\"/><Out path=\"PROJECT_PATH/out\"/>")?;
        let dest = dir.path().join("rendered.xml");

        render_file(&src, &dest, &[("PROJECT_PATH", "/src/work/foundation")])?;
        assert_eq!(
            std::fs::read_to_string(dest)?,
            "<Target path=\"/src/work/foundation\"/><Out path=\"/src/work/foundation/out\"/>"
        );
        Ok(())
    }

    #[test]
    fn test_render_db_config_writes_updated_copy() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let server = dir.path().join("server.xml");
        std::fs::write(
            &server,
            "jdbc:db2://__DB_HOST__:__DB_PORT__/__DB_NAME__ user=__DB_USER__ pw=__DB_PASS__ schema=__DB_SCHEMA__",
        )?;

        let updated = render_db_config(&server, &db_secrets())?;
        assert_eq!(updated, dir.path().join("server.xml.updated"));
        assert_eq!(
            std::fs::read_to_string(updated)?,
            "jdbc:db2://db.local:50000/OMDB user=db2inst1 pw=pw schema=OMS"
        );
        assert!(std::fs::read_to_string(&server)?.contains("__DB_HOST__"));
        Ok(())
    }

    #[test]
    fn test_render_db_config_requires_every_variable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("system_overrides.properties");
        std::fs::write(&file, "host=__DB_HOST__")?;

        let err = render_db_config(&file, &Secrets::default()).unwrap_err();
        assert!(err.to_string().contains("DB_HOST"));
        assert!(!dir.path().join("system_overrides.properties.updated").exists());
        Ok(())
    }
}
