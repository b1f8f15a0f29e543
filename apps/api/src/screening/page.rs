//! Server-rendered screening page: the upload form and the ranked candidate table.

use std::fmt::Write;

use crate::models::candidate::Candidate;
use crate::session::ScreeningSession;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 960px; color: #222; }
h1 { font-size: 1.6rem; }
form.screen label { display: block; margin-top: 1rem; font-weight: 600; }
form.screen textarea { width: 100%; min-height: 10rem; }
form.screen input[type=text] { width: 100%; }
.actions { display: flex; gap: 1rem; margin-top: 1rem; }
table { border-collapse: collapse; width: 100%; margin-top: 2rem; }
th, td { border-bottom: 1px solid #ddd; padding: .5rem; text-align: left; vertical-align: top; }
td.score { font-variant-numeric: tabular-nums; font-weight: 600; }
.skill { display: inline-block; background: #eef; border-radius: 3px; padding: 0 .3rem; margin: 0 .2rem .2rem 0; }
.muted { color: #777; }
"#;

/// Escapes text for use in HTML element content and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the full page for the current session.
pub fn render_page(session: &ScreeningSession) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Resume Screener</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Resume Screener</h1>
<form class="screen" method="post" action="/" enctype="multipart/form-data">
<label for="job_description">Job description</label>
<textarea id="job_description" name="job_description" required>{jd}</textarea>
<label for="skills">Skills (comma-separated)</label>
<input type="text" id="skills" name="skills" value="{skills}" required>
<label for="resumes">Resumes (PDF, DOC, DOCX, TXT)</label>
<input type="file" id="resumes" name="resumes" multiple accept=".pdf,.doc,.docx,.txt">
<div class="actions"><button type="submit">Screen candidates</button></div>
</form>
<form method="post" action="/clear" class="actions"><button type="submit">Clear session</button></form>
"#,
        jd = escape_html(&session.job_description),
        skills = escape_html(&session.skills),
    );

    if session.candidates.is_empty() {
        html.push_str("<p class=\"muted\">No candidates screened yet.</p>\n");
    } else {
        render_table(&mut html, &session.candidates);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_table(html: &mut String, candidates: &[Candidate]) {
    html.push_str(
        "<table>\n<thead><tr><th>#</th><th>Candidate</th><th>Score</th><th>Skills</th><th>Experience</th></tr></thead>\n<tbody>\n",
    );
    for (rank, candidate) in candidates.iter().enumerate() {
        let skills = if candidate.skills.is_empty() {
            "<span class=\"muted\">none matched</span>".to_string()
        } else {
            candidate
                .skills
                .iter()
                .map(|s| format!("<span class=\"skill\">{}</span>", escape_html(s)))
                .collect()
        };
        let experience = if candidate.experience.is_empty() {
            "<span class=\"muted\">—</span>".to_string()
        } else {
            let items: String = candidate
                .experience
                .iter()
                .map(|e| format!("<li>{}</li>", escape_html(e)))
                .collect();
            format!("<ul>{items}</ul>")
        };
        let _ = writeln!(
            html,
            "<tr><td>{rank}</td><td>{name}<br><span class=\"muted\">{file}</span></td><td class=\"score\">{score:.2}</td><td>{skills}</td><td>{experience}</td></tr>",
            rank = rank + 1,
            name = escape_html(&candidate.name),
            file = escape_html(&candidate.source_file),
            score = candidate.score,
        );
    }
    html.push_str("</tbody>\n</table>\n");
}
