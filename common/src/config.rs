use std::env;

#[derive(clap::Args, Debug, Clone)]
#[command(next_help_heading = "Database")]
#[group(id = "database")]
pub struct Database {
    #[arg(id = "db-path", long, env = "VULNDB_DB_PATH", default_value_t = Self::default().path)]
    pub path: String,
    #[arg(
        id = "db-max-conn",
        long,
        env = "VULNDB_DB_MAX_CONN",
        default_value_t = Self::default().max_conn,
    )]
    pub max_conn: u32,
}

// The env fallbacks are repeated here because `default_value_t` does not
// compose with `flatten` in a parent parser,
// see https://github.com/clap-rs/clap/issues/3269
impl Default for Database {
    fn default() -> Self {
        const DEFAULT_MAX_CONN: u32 = 4;
        Database {
            path: env::var("VULNDB_DB_PATH").unwrap_or("vulnerability.db".into()),
            max_conn: match env::var("VULNDB_DB_MAX_CONN") {
                Ok(s) => match s.parse::<u32>() {
                    Ok(n) => n,
                    Err(_) => {
                        log::warn!("VULNDB_DB_MAX_CONN should be an integer; using {DEFAULT_MAX_CONN}");
                        DEFAULT_MAX_CONN
                    }
                },
                _ => DEFAULT_MAX_CONN,
            },
        }
    }
}

impl Database {
    /// A configuration for a throwaway in-memory database.
    pub fn in_memory() -> Self {
        Database {
            path: ":memory:".into(),
            max_conn: 1,
        }
    }
}
