use clap::ValueEnum;
use colored::*;
use ostrichdb_agent::{PlanOutcome, PlannedRequest};
use ostrichdb_client::{Method, OstrichResponse};
use serde_json::{json, Value};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    Compact,
    #[default]
    Pretty,
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_colorize(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                // Check if stdout is a TTY and colors are supported
                atty::is(atty::Stream::Stdout)
                    && supports_color::on(supports_color::Stream::Stdout).is_some()
            }
        }
    }
}

/// Response bodies are opaque text; show JSON ones as JSON when we can.
fn body_value(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) if value.is_object() || value.is_array() => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string())
        }
        _ => body.to_string(),
    }
}

fn paint_status(status: u16, colorize: bool) -> String {
    let text = status.to_string();
    if !colorize {
        return text;
    }
    match status {
        200..=299 => text.green().bold().to_string(),
        400..=499 => text.yellow().bold().to_string(),
        _ => text.red().bold().to_string(),
    }
}

/// Format one response
pub fn format_response(res: &OstrichResponse, format: OutputFormat, colorize: bool) -> String {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "method": res.method,
                "url": res.url,
                "status": res.status.as_u16(),
                "headers": res.header_map(),
                "body": body_value(&res.body),
            });
            serde_json::to_string_pretty(&value).unwrap_or_default()
        }
        OutputFormat::Compact => {
            let body = res.body.replace('\n', " ");
            let line = format!("{} {} {}", res.status.as_u16(), res.method, res.url);
            if body.trim().is_empty() {
                line
            } else {
                format!("{} {}", line, body.trim())
            }
        }
        OutputFormat::Pretty => {
            let method = if colorize {
                res.method.as_str().bold().to_string()
            } else {
                res.method.to_string()
            };
            let mut output = vec![format!(
                "{} {} {}",
                paint_status(res.status.as_u16(), colorize),
                method,
                res.url
            )];

            // HEAD answers carry their information in the headers
            if res.method == Method::Head {
                for (name, value) in res.header_map() {
                    if colorize {
                        output.push(format!("  {}: {}", name.bright_black(), value));
                    } else {
                        output.push(format!("  {}: {}", name, value));
                    }
                }
            } else if !res.body.trim().is_empty() {
                output.push(pretty_body(&res.body));
            }
            output.join("\n")
        }
    }
}

/// Format a failed request's status and body
pub fn format_failure(
    method: Method,
    url: &str,
    status: u16,
    body: &str,
    format: OutputFormat,
    colorize: bool,
) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "method": method,
            "url": url,
            "status": status,
            "body": body_value(body),
        }))
        .unwrap_or_default(),
        OutputFormat::Compact => format!("{} {} {} {}", status, method, url, body.replace('\n', " ")),
        OutputFormat::Pretty => {
            let mut line = format!("{} {} {}", paint_status(status, colorize), method, url);
            if !body.trim().is_empty() {
                line.push('\n');
                line.push_str(&pretty_body(body));
            }
            line
        }
    }
}

/// Format the requests a dry run would send
pub fn format_plan(plan: &[PlannedRequest], format: OutputFormat, colorize: bool) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
        OutputFormat::Compact => plan
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Pretty => {
            if plan.is_empty() {
                return "Nothing to do".to_string();
            }
            plan.iter()
                .enumerate()
                .map(|(i, request)| {
                    let step = format!("[{}/{}]", i + 1, plan.len());
                    if colorize {
                        format!("{} {}", step.dimmed(), request.to_string().cyan())
                    } else {
                        format!("{} {}", step, request)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Format the outcome of an executed plan, one line per request plus a summary
pub fn format_outcomes(outcomes: &[PlanOutcome], format: OutputFormat, colorize: bool) -> String {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(outcomes).unwrap_or_default();
    }

    let mut lines: Vec<String> = outcomes
        .iter()
        .map(|outcome| {
            let mark = match (outcome.is_success(), colorize) {
                (true, true) => "✓".green().bold().to_string(),
                (true, false) => "✓".to_string(),
                (false, true) => "✗".red().bold().to_string(),
                (false, false) => "✗".to_string(),
            };
            let detail = match (&outcome.error, &outcome.body) {
                (Some(err), _) => err.clone(),
                (None, Some(body)) if format == OutputFormat::Pretty => pretty_body(body),
                (None, Some(body)) => body.replace('\n', " "),
                (None, None) => String::new(),
            };
            if detail.trim().is_empty() {
                format!("{} {}", mark, outcome.request)
            } else {
                format!("{} {}: {}", mark, outcome.request, detail.trim())
            }
        })
        .collect();

    lines.push(format_summary(outcomes, colorize));
    lines.join("\n")
}

/// Format succeeded / failed counts
pub fn format_summary(outcomes: &[PlanOutcome], colorize: bool) -> String {
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    let failed = outcomes.len() - succeeded;

    if outcomes.is_empty() {
        return "No requests sent".to_string();
    }
    let parts: Vec<String> = [
        (succeeded > 0).then(|| {
            if colorize {
                format!("{} succeeded", succeeded.to_string().green())
            } else {
                format!("{} succeeded", succeeded)
            }
        }),
        (failed > 0).then(|| {
            if colorize {
                format!("{} failed", failed.to_string().red())
            } else {
                format!("{} failed", failed)
            }
        }),
    ]
    .into_iter()
    .flatten()
    .collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostrichdb_client::{RecordParams, RecordPath, RecordType};
    use pretty_assertions::assert_eq;
    use reqwest::{header::HeaderMap, StatusCode};

    fn response(method: Method, body: &str) -> OstrichResponse {
        let mut headers = HeaderMap::new();
        headers.insert("x-ostrich-count", "2".parse().unwrap());
        OstrichResponse {
            method,
            url: "http://localhost:8042/c/users".to_string(),
            status: StatusCode::OK,
            headers,
            body: body.to_string(),
        }
    }

    fn outcome(ok: bool) -> PlanOutcome {
        PlanOutcome {
            request: PlannedRequest {
                method: Method::Post,
                path: RecordPath::new("users", "admins", "age").unwrap().into(),
                params: RecordParams::typed(RecordType::Integer),
            },
            status: Some(if ok { 200 } else { 409 }),
            body: ok.then(|| "created".to_string()),
            error: (!ok).then(|| "409 Conflict".to_string()),
        }
    }

    #[test]
    fn compact_is_one_line() {
        let res = response(Method::Get, "line one\nline two");
        assert_eq!(
            format_response(&res, OutputFormat::Compact, false),
            "200 GET http://localhost:8042/c/users line one line two"
        );
    }

    #[test]
    fn pretty_head_lists_headers() {
        let res = response(Method::Head, "");
        assert_eq!(
            format_response(&res, OutputFormat::Pretty, false),
            "200 HEAD http://localhost:8042/c/users\n  x-ostrich-count: 2"
        );
    }

    #[test]
    fn json_embeds_json_bodies() {
        let res = response(Method::Get, r#"{"records": 2}"#);
        let value: Value =
            serde_json::from_str(&format_response(&res, OutputFormat::Json, false)).unwrap();
        assert_eq!(value["status"], 200);
        assert_eq!(value["method"], "GET");
        assert_eq!(value["body"]["records"], 2);
        assert_eq!(value["headers"]["x-ostrich-count"], "2");
    }

    #[test]
    fn outcomes_end_with_summary() {
        let text = format_outcomes(&[outcome(true), outcome(false)], OutputFormat::Compact, false);
        assert_eq!(
            text,
            "✓ POST /c/users/cl/admins/r/age type=INTEGER: created\n\
             ✗ POST /c/users/cl/admins/r/age type=INTEGER: 409 Conflict\n\
             1 succeeded, 1 failed"
        );
        assert_eq!(format_summary(&[], false), "No requests sent");
    }

    #[test]
    fn plan_steps_are_numbered() {
        let plan = vec![outcome(true).request];
        assert_eq!(
            format_plan(&plan, OutputFormat::Pretty, false),
            "[1/1] POST /c/users/cl/admins/r/age type=INTEGER"
        );
        assert_eq!(format_plan(&[], OutputFormat::Pretty, false), "Nothing to do");
    }
}
