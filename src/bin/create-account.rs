//! Create a site account, or deactivate one, against the configured database.
//!
//! Usage:
//!   create-account <EMAIL> <PASSWORD> [--staff] [--superuser] [--pastor] [--event-uploader]
//!   create-account --deactivate <EMAIL>

use anyhow::{bail, Context};
use church_site::accounts::{hash_password, normalize_email};
use church_site::db::{self, models::NewAccount, repository::AccountRepository, PgStore};
use church_site::forms::is_valid_email;

const USAGE: &str = "Usage: create-account <EMAIL> <PASSWORD> [--staff] [--superuser] [--pastor] [--event-uploader]\n       create-account --deactivate <EMAIL>";

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Create(NewAccountArgs),
    Deactivate(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct NewAccountArgs {
    email: String,
    password: String,
    is_staff: bool,
    is_superuser: bool,
    is_pastor: bool,
    is_event_uploader: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    if args.first().map(String::as_str) == Some("--deactivate") {
        let email = args.get(1).context(USAGE)?;
        return Ok(Command::Deactivate(normalize_email(email)));
    }

    let mut positional = Vec::new();
    let mut parsed = NewAccountArgs::default();
    for arg in args {
        match arg.as_str() {
            "--staff" => parsed.is_staff = true,
            "--superuser" => parsed.is_superuser = true,
            "--pastor" => parsed.is_pastor = true,
            "--event-uploader" => parsed.is_event_uploader = true,
            flag if flag.starts_with("--") => bail!("unknown flag {}\n{}", flag, USAGE),
            value => positional.push(value.to_string()),
        }
    }

    let [email, password] = positional.as_slice() else {
        bail!(USAGE);
    };
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        bail!("{} is not a valid email address", email);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    parsed.email = email;
    parsed.password = password.clone();
    Ok(Command::Create(parsed))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    if std::env::var("DATABASE_URL").is_err() {
        bail!("DATABASE_URL must be set; accounts are stored in the database");
    }
    let pool = db::init_pool(None).await.context("failed to connect to database")?;
    db::run_migrations(&pool).await.context("failed to run migrations")?;
    let store = PgStore::new(pool);

    match command {
        Command::Create(args) => {
            let password_hash = hash_password(args.password).await?;
            let account = store
                .create_account(NewAccount {
                    email: args.email,
                    password_hash,
                    is_staff: args.is_staff,
                    is_superuser: args.is_superuser,
                    is_pastor: args.is_pastor,
                    is_event_uploader: args.is_event_uploader,
                    ..NewAccount::default()
                })
                .await?;
            println!("Created account {} ({})", account.id, account.email);
        }
        Command::Deactivate(email) => {
            let account = store
                .find_account_by_email(&email)
                .await?
                .with_context(|| format!("no account for {}", email))?;
            store.set_account_active(account.id, false).await?;
            println!("Deactivated account {} ({})", account.id, account.email);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_create_with_flags() {
        let command = parse_args(&args(&["Pastor@Church.ORG", "hunter222", "--pastor"])).unwrap();
        let Command::Create(parsed) = command else {
            panic!("expected create");
        };
        assert_eq!(parsed.email, "Pastor@church.org");
        assert!(parsed.is_pastor);
        assert!(!parsed.is_staff);
    }

    #[test]
    fn test_parse_rejects_short_password_and_unknown_flag() {
        assert!(parse_args(&args(&["a@b.org", "short"])).is_err());
        assert!(parse_args(&args(&["a@b.org", "longenough", "--admin"])).is_err());
        assert!(parse_args(&args(&["a@b.org"])).is_err());
    }

    #[test]
    fn test_parse_deactivate() {
        assert_eq!(
            parse_args(&args(&["--deactivate", "a@B.org"])).unwrap(),
            Command::Deactivate("a@b.org".to_string())
        );
    }
}
