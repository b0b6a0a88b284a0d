use crate::directory::UserAccount;

/// Flatten a candidate's profile into the free text the scoring oracle reads.
///
/// Fields appear in a fixed order (name, position, bio, experience, skills,
/// resume link), one per line; absent fields are skipped entirely.
pub fn candidate_profile_text(account: &UserAccount) -> String {
    let profile = &account.profile;
    let mut lines: Vec<String> = Vec::with_capacity(6);

    if let Some(name) = account.full_name() {
        lines.push(name);
    }
    if let Some(position) = present(&profile.current_position) {
        lines.push(position.to_string());
    }
    if let Some(bio) = present(&profile.bio) {
        lines.push(bio.to_string());
    }
    if let Some(years) = profile.years_of_experience {
        lines.push(format!("{years} years of experience"));
    }
    if !profile.skills.is_empty() {
        let skills: Vec<&str> = profile.skills.iter().map(String::as_str).collect();
        lines.push(format!("Skills: {}", skills.join(", ")));
    }
    if let Some(url) = present(&profile.resume_url) {
        lines.push(format!("Resume available at: {url}"));
    }

    lines.join("\n")
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}
