use crate::pipeline::ProcessOutcome;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const FORM: &str = r#"<form method="post" action="/" enctype="multipart/form-data">
  <fieldset>
    <legend>Input</legend>
    <label><input type="radio" name="input_type" value="text" checked> Text</label>
    <label><input type="radio" name="input_type" value="url"> URL</label>
    <label><input type="radio" name="input_type" value="pdf"> PDF</label>
  </fieldset>
  <p><textarea name="text_input" rows="8" cols="100" placeholder="Paste text here"></textarea></p>
  <p><input type="url" name="url_input" size="100" placeholder="https://example.com/article"></p>
  <p><input type="file" name="pdf_file" accept="application/pdf"></p>
  <p><button type="submit">Generate graph</button></p>
</form>"#;

/// The single page of the web UI: the input form, then either an error or
/// the recognized entities and the rendered graph.
pub fn index_page(outcome: Option<&ProcessOutcome>, error: Option<&str>) -> String {
    let mut body = String::new();

    if let Some(error) = error {
        body.push_str(&format!(
            "<div class=\"error\">{}</div>\n",
            html_escape(error)
        ));
    }

    if let Some(outcome) = outcome {
        if let Some(title) = &outcome.title {
            body.push_str(&format!("<h2>{}</h2>\n", html_escape(title)));
        }

        body.push_str("<h3>Entities</h3>\n<table>\n<tr><th>Entity</th><th>Type</th></tr>\n");
        for entity in &outcome.entities {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(&entity.text),
                html_escape(&entity.label)
            ));
        }
        body.push_str("</table>\n");

        body.push_str(&format!(
            "<h3>Knowledge graph</h3>\n<iframe src=\"/static/{}\" width=\"100%\" height=\"780\" frameborder=\"0\"></iframe>\n",
            html_escape(&outcome.graph_filename)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Knowledge Graph</title>
<style>
  body {{ font-family: sans-serif; margin: 2em; }}
  .error {{ color: #b00020; border: 1px solid #b00020; padding: 0.5em; margin-bottom: 1em; }}
  table {{ border-collapse: collapse; }}
  td, th {{ border: 1px solid #ccc; padding: 0.2em 0.6em; text-align: left; }}
</style>
</head>
<body>
<h1>Knowledge Graph</h1>
{form}
{body}</body>
</html>
"#,
        form = FORM,
        body = body,
    )
}
