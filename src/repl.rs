use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::io::{self, Write};

use crate::config::Config;
use crate::content::StudyContent;
use crate::fetcher::ExplanationFetcher;
use crate::gateway::{ContentGenerator, ImageSearch};
use crate::session::{LoadingState, StudySession};
use crate::subjects::SUBJECTS;

pub async fn run_repl<G, I>(fetcher: &ExplanationFetcher<G, I>, cfg: &Config) -> Result<()>
where
    G: ContentGenerator,
    I: ImageSearch,
{
    let mut session = StudySession::new();

    println!("scholarsync study aid");
    println!("model: {} ({})", cfg.model, cfg.model_provider);
    println!(
        "pick a subject with '/subject <id>', then type a topic; '/subjects' lists subjects, \
         '/reset' starts over, 'exit' quits"
    );
    print_subjects();

    loop {
        print!("{}> ", prompt_label(&session));
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read stdin")?;
        if read == 0 {
            break;
        }

        let line = input.trim();
        let topic = match parse_command(line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => break,
            ReplCommand::Subjects => {
                print_subjects();
                continue;
            }
            ReplCommand::Reset => {
                session.reset();
                println!("session reset\n");
                continue;
            }
            ReplCommand::Subject(None) => {
                println!("usage: /subject <id>\n");
                continue;
            }
            ReplCommand::Subject(Some(raw)) => {
                match session.select_subject(raw) {
                    Ok(subject) => println!("subject: {} {}\n", subject.icon, subject.label),
                    Err(err) => println!("{err}\n"),
                }
                continue;
            }
            ReplCommand::Unknown(command) => {
                println!("unknown command '{command}'; try /subjects, /subject <id>, /reset\n");
                continue;
            }
            ReplCommand::Topic(topic) => topic,
        };

        if session.subject().is_none() {
            println!("select a subject first with '/subject <id>'\n");
            continue;
        }

        session.set_topic(topic);
        println!("analyzing request...");
        session.submit(fetcher).await;
        print_outcome(&session);
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Empty,
    Exit,
    Subjects,
    Reset,
    Subject(Option<&'a str>),
    Unknown(&'a str),
    Topic(&'a str),
}

/// Command words are case-insensitive. Anything starting with `/` is a
/// command, so a mistyped one never reaches the model as a topic.
fn parse_command(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ReplCommand::Exit;
    }
    if !line.starts_with('/') {
        return ReplCommand::Topic(line);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));
    match word.to_ascii_lowercase().as_str() {
        "/subjects" => ReplCommand::Subjects,
        "/reset" => ReplCommand::Reset,
        "/subject" => ReplCommand::Subject(Some(rest).filter(|value| !value.is_empty())),
        _ => ReplCommand::Unknown(word),
    }
}

fn prompt_label(session: &StudySession) -> &'static str {
    session.subject().map_or("", |subject| subject.id)
}

fn print_subjects() {
    for subject in SUBJECTS {
        println!("  {} {:<18} {}", subject.icon, subject.id, subject.label);
    }
    println!();
}

fn print_outcome(session: &StudySession) {
    match (session.state(), session.result()) {
        (LoadingState::Success, Some(content)) => {
            println!(
                "{}",
                render_study_content(session.topic(), content, session.settled_at())
            );
        }
        _ => {
            if let Some(message) = session.error() {
                println!("{message}\n");
            }
        }
    }
}

/// Plain-text layout of one result.
struct StudyView<'a> {
    topic: &'a str,
    content: &'a StudyContent,
    generated_at: Option<DateTime<Utc>>,
}

impl fmt::Display for StudyView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = self.content;
        writeln!(f, "== {} ==", self.topic.trim())?;
        writeln!(f)?;
        writeln!(f, "Definition")?;
        writeln!(f, "  {}", content.definition.trim())?;
        writeln!(f)?;
        writeln!(f, "Key points")?;
        for (idx, point) in content.key_points.iter().enumerate() {
            writeln!(f, "  {}. {}", idx + 1, point.trim())?;
        }
        writeln!(f)?;
        writeln!(f, "Example: {}", content.example.title.trim())?;
        writeln!(f, "  {}", content.example.content.trim())?;
        if let Some(url) = &content.image_url {
            writeln!(f)?;
            writeln!(f, "Illustration: {url}")?;
        }
        if let Some(at) = self.generated_at {
            writeln!(f)?;
            writeln!(f, "generated {}", at.to_rfc3339_opts(SecondsFormat::Secs, true))?;
        }
        Ok(())
    }
}

pub fn render_study_content(
    topic: &str,
    content: &StudyContent,
    generated_at: Option<DateTime<Utc>>,
) -> String {
    StudyView {
        topic,
        content,
        generated_at,
    }
    .to_string()
}
