use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_portal::auth::TokenService;
use job_portal::config::AppConfig;
use job_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "portal",
    about = "Run the job portal API and its operator utilities",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Mint credentials with the configured signing secret
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Seed an in-memory portal and walk one application through scoring and review
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue an access (or refresh) credential for an account e-mail
    Issue(IssueArgs),
}

#[derive(Args, Debug)]
struct IssueArgs {
    /// E-mail the credential is issued to
    #[arg(long)]
    subject: String,
    /// Issue a refresh credential instead of an access credential
    #[arg(long)]
    refresh: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Token {
            command: TokenCommand::Issue(args),
        } => issue_token(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

fn issue_token(args: IssueArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let tokens = TokenService::new(&config.auth);
    let credential = if args.refresh {
        tokens.issue_refresh(&args.subject)?
    } else {
        tokens.issue_access(&args.subject)?
    };

    println!("{}", credential.token);
    eprintln!(
        "{:?} credential for {} expires {}",
        credential.kind,
        credential.subject,
        credential.expires_at.to_rfc3339()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["portal"]).expect("parse");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["portal", "serve", "--port", "8081"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Command::Serve(ServeArgs { port: Some(8081), .. }))
        ));
    }

    #[test]
    fn token_issue_requires_subject() {
        assert!(Cli::try_parse_from(["portal", "token", "issue"]).is_err());

        let cli = Cli::try_parse_from([
            "portal",
            "token",
            "issue",
            "--subject",
            "recruiter@demo.com",
            "--refresh",
        ])
        .expect("parse");
        match cli.command {
            Some(Command::Token {
                command: TokenCommand::Issue(args),
            }) => {
                assert_eq!(args.subject, "recruiter@demo.com");
                assert!(args.refresh);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn demo_accepts_scoring_override() {
        let cli = Cli::try_parse_from(["portal", "demo", "--ml-url", "http://localhost:8000"])
            .expect("parse");
        match cli.command {
            Some(Command::Demo(args)) => {
                assert_eq!(args.ml_url.as_deref(), Some("http://localhost:8000"));
                assert!(!args.skip_review);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
