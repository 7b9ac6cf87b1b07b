use axum::response::Html;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Resume Matcher</title>
</head>
<body>
  <h1>Resume Matcher</h1>
  <form action="/api/v1/match" method="post" enctype="multipart/form-data">
    <p>
      <label for="resume">Resume (PDF, DOCX, TXT, JPG, PNG)</label><br>
      <input id="resume" type="file" name="resume" accept=".pdf,.docx,.txt,.jpg,.jpeg,.png" required>
    </p>
    <p>
      <label for="job_description">Job description</label><br>
      <textarea id="job_description" name="job_description" rows="12" cols="80" required></textarea>
    </p>
    <button type="submit">Match</button>
  </form>
</body>
</html>
"#;

/// GET /
/// Upload form posting to the match endpoint.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
