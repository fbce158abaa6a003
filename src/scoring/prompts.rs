pub const ATS_SYSTEM: &str = "You are an ATS expert. Return only valid JSON with score, \
    missingKeywords array, and suggestions array.";

const ATS_USER_TEMPLATE: &str = "Analyze this resume against the job description.

Resume: {resume}

Job: {job}

Provide ATS score (0-100), top 5 missing keywords, and 3-4 improvement tips. \
Respond with a JSON object of the form \
{\"score\": <integer 0-100>, \"missingKeywords\": [<string>], \"suggestions\": [<string>]}.";

pub fn ats_user_prompt(resume: &str, job: &str) -> String {
    // job first: a résumé containing "{job}" must not be re-expanded
    ATS_USER_TEMPLATE
        .replacen("{job}", job, 1)
        .replacen("{resume}", resume, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_embeds_both_texts() {
        let prompt = ats_user_prompt("Rust engineer, 5 years", "Senior backend role");
        assert!(prompt.contains("Resume: Rust engineer, 5 years"));
        assert!(prompt.contains("Job: Senior backend role"));
        assert!(!prompt.contains("{resume}"));
    }

    #[test]
    fn placeholders_inside_inputs_are_left_alone() {
        let prompt = ats_user_prompt("I write {job} templates", "Templating role");
        assert!(prompt.contains("Resume: I write {job} templates"));
    }
}
