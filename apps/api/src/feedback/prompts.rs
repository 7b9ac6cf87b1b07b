// Prompt templates for the remote feedback backends.

/// Keywords of each kind embedded in the primary prompt.
pub const PRIMARY_KEYWORD_LIMIT: usize = 30;

/// Primary (chat) prompt. Placeholders: {score}, {matched}, {missing}
pub const PRIMARY_PROMPT_TEMPLATE: &str = "You are an HR resume reviewer.
Resume match score: {score}%
Matched keywords: {matched}
Missing keywords: {missing}
Write concise, structured feedback (<600 chars):
Include strengths, weaknesses, and improvement suggestions.";

/// Secondary (plain completion) prompt. Placeholders: {score}, {matched}, {missing}
pub const SECONDARY_PROMPT_TEMPLATE: &str =
    "Resume score: {score}%. Matched: {matched}. Missing: {missing}. Give feedback under 600 characters.";

pub fn build_primary_prompt(matched: &[String], missing: &[String], score: f64) -> String {
    fill_template(
        PRIMARY_PROMPT_TEMPLATE,
        &[
            ("score", score.to_string()),
            ("matched", join_first(matched, PRIMARY_KEYWORD_LIMIT)),
            ("missing", join_first(missing, PRIMARY_KEYWORD_LIMIT)),
        ],
    )
}

/// The completion model gets the full keyword lists, rendered as quoted lists.
pub fn build_secondary_prompt(matched: &[String], missing: &[String], score: f64) -> String {
    fill_template(
        SECONDARY_PROMPT_TEMPLATE,
        &[
            ("score", score.to_string()),
            ("matched", quoted_list(matched)),
            ("missing", quoted_list(missing)),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over the template.
/// Substituted values are never rescanned.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..close])
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn quoted_list(keywords: &[String]) -> String {
    let items: Vec<String> = keywords.iter().map(|kw| format!("'{kw}'")).collect();
    format!("[{}]", items.join(", "))
}

pub(crate) fn join_first(keywords: &[String], limit: usize) -> String {
    keywords
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
