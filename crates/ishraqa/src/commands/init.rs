use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Ishraqa Configuration

[backend]
base_url = "https://flipped.spicydonut.biz"
# api_key = ""            # or ISHRAQA_API_KEY
debug = false
# timeout_secs = 30       # unset: no client-side timeout

[search]
index = "ishraqa"
hits_per_page = 20
# sort = "created_at:desc"
debounce_ms = 300

[gateway]
host = "127.0.0.1"
port = 8080
rate_limit_per_minute = 120
allowed_origins = []
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
