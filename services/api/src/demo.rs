use crate::server::Portal;
use chrono::Utc;
use clap::Args;
use job_portal::auth::TokenService;
use job_portal::config::AppConfig;
use job_portal::directory::{DirectoryError, IdentityDirectory, Role, UserAccount, UserProfile};
use job_portal::error::AppError;
use job_portal::jobs::JobDraft;
use job_portal::workflows::applications::{Application, ApplicationStatus, NEUTRAL_MATCH_SCORE};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::info;

const DEMO_PASSWORD: &str = "password123";
pub(crate) const DEMO_SEEKER_EMAIL: &str = "jobseeker@demo.com";
pub(crate) const DEMO_RECRUITER_EMAIL: &str = "recruiter@demo.com";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the scoring service base URL for this run.
    #[arg(long)]
    pub(crate) ml_url: Option<String>,
    /// Milliseconds to wait on the scoring service before falling back.
    #[arg(long)]
    pub(crate) scoring_timeout_ms: Option<u64>,
    /// Skip the recruiter review step.
    #[arg(long)]
    pub(crate) skip_review: bool,
}

/// Populate an empty portal with one job seeker, one recruiter and two postings.
///
/// Does nothing when any account already exists.
pub(crate) fn seed_demo_data(portal: &Portal) -> Result<(), AppError> {
    if !portal.identities.is_empty() {
        return Ok(());
    }

    let seeker = demo_account(
        portal,
        DEMO_SEEKER_EMAIL,
        Role::JobSeeker,
        UserProfile {
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            current_position: Some("Senior Software Engineer".to_string()),
            years_of_experience: Some(5),
            skills: skills(&["Java", "Spring Boot", "React", "MongoDB"]),
            location: Some("San Francisco, CA".to_string()),
            bio: Some(
                "Backend-leaning engineer who has shipped payment and search systems.".to_string(),
            ),
            ..UserProfile::default()
        },
    )?;
    let recruiter = demo_account(
        portal,
        DEMO_RECRUITER_EMAIL,
        Role::Recruiter,
        UserProfile {
            first_name: Some("Jane".to_string()),
            last_name: Some("Smith".to_string()),
            company_name: Some("TechCorp Inc".to_string()),
            company_website: Some("https://techcorp.com".to_string()),
            ..UserProfile::default()
        },
    )?;

    let postings = [
        JobDraft {
            title: "Senior Backend Developer".to_string(),
            description: "Design and operate the services behind our hiring platform."
                .to_string(),
            company_name: Some("TechCorp Inc".to_string()),
            location: Some("San Francisco, CA".to_string()),
            employment_type: Some("FULL_TIME".to_string()),
            min_salary: Some(120_000),
            max_salary: Some(180_000),
            required_skills: skills(&["Java", "Spring Boot", "Microservices", "AWS"]),
            min_years_of_experience: Some(5),
            education_level: Some("Bachelor's".to_string()),
            ..JobDraft::default()
        },
        JobDraft {
            title: "Full Stack Developer".to_string(),
            description: "Build candidate-facing features from the GraphQL layer to the UI."
                .to_string(),
            company_name: Some("TechCorp Inc".to_string()),
            location: Some("Remote".to_string()),
            employment_type: Some("FULL_TIME".to_string()),
            min_salary: Some(100_000),
            max_salary: Some(150_000),
            required_skills: skills(&["React", "TypeScript", "Node.js", "GraphQL"]),
            min_years_of_experience: Some(3),
            ..JobDraft::default()
        },
    ];
    for draft in postings {
        portal.job_service.create(draft, &recruiter.id)?;
    }

    info!(
        seeker_id = %seeker.id,
        recruiter_id = %recruiter.id,
        "demo accounts and postings seeded"
    );
    Ok(())
}

fn demo_account(
    portal: &Portal,
    email: &str,
    role: Role,
    profile: UserProfile,
) -> Result<UserAccount, AppError> {
    let now = Utc::now();
    let account = portal.identities.insert(UserAccount {
        id: portal.identities.next_id(),
        email: email.to_string(),
        role,
        active: true,
        profile,
        created_at: now,
        updated_at: now,
    })?;
    portal.credentials.set(&account.id, DEMO_PASSWORD)?;
    Ok(account)
}

fn skills(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Seed a throwaway portal, apply as the demo job seeker and print the outcome.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(url) = args.ml_url {
        config.scoring.base_url = url;
    }
    if let Some(timeout) = args.scoring_timeout_ms {
        config.scoring.timeout = Duration::from_millis(timeout);
    }

    let portal = Portal::assemble(
        TokenService::new(&config.auth),
        &config.scoring,
        &config.storage,
    )?;
    seed_demo_data(&portal)?;

    let seeker = portal
        .identities
        .find_by_email(DEMO_SEEKER_EMAIL)?
        .ok_or(DirectoryError::NotFound)?;
    let recruiter = portal
        .identities
        .find_by_email(DEMO_RECRUITER_EMAIL)?
        .ok_or(DirectoryError::NotFound)?;
    let Some(job) = portal.job_service.list_by_recruiter(&recruiter.id)?.pop() else {
        println!("No demo postings available");
        return Ok(());
    };

    println!("Job portal demo");
    println!("  Scoring service: {}", config.scoring.base_url);
    println!("  Posting: {} ({})", job.title, job.id);

    let application = portal
        .workflow
        .submit(
            &job.id,
            &seeker.id,
            Some("I have led two Spring Boot migrations.".to_string()),
        )
        .await?;
    println!("  Match score: {}", score_label(&application));

    let view = if args.skip_review {
        application.view()
    } else {
        portal
            .workflow
            .update_status(&application.id, ApplicationStatus::Reviewing, &recruiter.id)?
    };
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("  Application payload:\n{}", json),
        Err(err) => println!("  Application payload unavailable: {}", err),
    }

    let access = portal.tokens.issue_access(&seeker.email)?;
    println!("  Job seeker bearer credential:\n{}", access.token);

    Ok(())
}

fn score_label(application: &Application) -> String {
    match application.match_score {
        Some(score)
            if score == NEUTRAL_MATCH_SCORE && application.match_breakdown.0.is_empty() =>
        {
            format!("{score:.1} (scoring service unavailable, neutral fallback)")
        }
        Some(score) => format!("{score:.1}"),
        None => "pending".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_portal::config::{AuthConfig, ScoringConfig, StorageConfig};
    use job_portal::directory::{JobDirectory, JobId, UserId};
    use job_portal::workflows::applications::ApplicationId;

    fn portal() -> Portal {
        Portal::assemble(
            TokenService::new(&AuthConfig {
                signing_secret: "demo-secret".to_string(),
                access_ttl: Duration::from_secs(60),
                refresh_ttl: Duration::from_secs(600),
            }),
            &ScoringConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                timeout: Duration::from_millis(200),
            },
            &StorageConfig {
                resume_dir: None,
                public_base_url: "http://localhost/files".to_string(),
            },
        )
        .expect("portal assembles")
    }

    #[test]
    fn seeding_creates_accounts_and_postings_once() {
        let portal = portal();
        seed_demo_data(&portal).expect("seed");
        seed_demo_data(&portal).expect("second seed is a no-op");

        let recruiter = portal
            .identities
            .find_by_email(DEMO_RECRUITER_EMAIL)
            .expect("lookup")
            .expect("recruiter seeded");
        assert_eq!(recruiter.profile.company_name.as_deref(), Some("TechCorp Inc"));

        let postings = portal.jobs.list_by_recruiter(&recruiter.id).expect("list");
        assert_eq!(postings.len(), 2);
        assert!(postings
            .iter()
            .any(|job| job.title == "Full Stack Developer" && job.location.as_deref() == Some("Remote")));

        let seeker = portal
            .identities
            .find_by_email(DEMO_SEEKER_EMAIL)
            .expect("lookup")
            .expect("seeker seeded");
        assert!(portal
            .credentials
            .verify(&seeker.id, DEMO_PASSWORD)
            .expect("verify"));
    }

    #[tokio::test]
    async fn seeded_seeker_receives_neutral_score_when_scoring_is_down() {
        let portal = portal();
        seed_demo_data(&portal).expect("seed");
        let seeker = portal
            .identities
            .find_by_email(DEMO_SEEKER_EMAIL)
            .expect("lookup")
            .expect("seeker");
        let job = portal.jobs.list_active().expect("list").remove(0);

        let application = portal
            .workflow
            .submit(&job.id, &seeker.id, None)
            .await
            .expect("submit succeeds without scoring");
        assert_eq!(application.match_score, Some(50.0));
        assert!(application.match_breakdown.0.is_empty());
    }

    #[test]
    fn only_the_neutral_fallback_is_labelled_degraded() {
        let now = Utc::now();
        let mut application = Application {
            id: ApplicationId("app-000001".to_string()),
            job_id: JobId("job-000001".to_string()),
            job_seeker_id: UserId("usr-000001".to_string()),
            status: ApplicationStatus::Pending,
            match_score: Some(NEUTRAL_MATCH_SCORE),
            match_breakdown: Default::default(),
            cover_letter: None,
            applied_at: now,
            updated_at: now,
        };
        assert_eq!(
            score_label(&application),
            "50.0 (scoring service unavailable, neutral fallback)"
        );

        application.match_score = Some(91.0);
        assert_eq!(score_label(&application), "91.0", "score without breakdown is still real");

        application.match_score = None;
        assert_eq!(score_label(&application), "pending");
    }
}
