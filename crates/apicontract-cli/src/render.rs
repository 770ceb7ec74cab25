//! Console rendering of run events
//!
//! Run-level lines are flush left; everything that happens inside a
//! resource test is indented with a tab.

use std::io::Write;

use apicontract_runner::{Event, Reporter, ResourceSummary};

/// Streams rendered events to a writer as they happen.
pub struct ConsoleReporter<W: Write> {
    out: W,
    aborted: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            aborted: false,
        }
    }

    /// Whether an error event was seen (the run was cut short).
    pub const fn aborted(&self) -> bool {
        self.aborted
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, event: Event) {
        if matches!(event, Event::Error { .. }) {
            self.aborted = true;
        }
        for line in render(&event) {
            // Nothing sensible to do if stdout is gone.
            let _ = writeln!(self.out, "{line}");
        }
    }
}

/// Lines printed for one event.
pub fn render(event: &Event) -> Vec<String> {
    match event {
        Event::TestingProject { project } => {
            vec![format!("Testing the {} @ {}", project.title, project.version)]
        }
        Event::UsingDefaultHost => {
            vec!["No host name has been specified, using the first one in the list.".into()]
        }
        Event::UsingHost { host } => {
            vec![format!("Using the \"{}\" host @ {}", host.name, host.url)]
        }
        Event::TestingResource { resource } => vec![format!(
            "Testing the \"{}\" resource @ {} {}",
            resource.name, resource.method, resource.path
        )],
        Event::UsingSecurity { scheme } => {
            vec![format!("\tUsing the '{scheme}' security settings.")]
        }
        Event::UsingRequest { content_type } => {
            vec![format!("\tUsing the '{content_type}' request.")]
        }
        Event::UsingResponse {
            status_code,
            content_type,
            schema,
        } => vec![match schema {
            Some(schema) => format!("\tTesting against the '{schema}' response."),
            None => format!(
                "\tTesting against the {} @ {status_code} response.",
                content_type.as_deref().unwrap_or("*/*")
            ),
        }],
        Event::Overriding { field, value } => {
            vec![format!("\tOverriding {field} with \"{value}\".")]
        }
        Event::Diagnostic { diagnostic } => vec![format!("\t{diagnostic}")],
        Event::AvailableResources { resources } => render_resources(resources),
        Event::Error { message, .. } => {
            vec!["\tBetter luck next time.".into(), format!("\t{message}")]
        }
        Event::ResourceOk { .. } => vec!["OK".into()],
        Event::ResourceFail { .. } => vec!["FAILURE".into()],
    }
}

/// "Available operations:" followed by a name / method+path pair per
/// operation, separated by blank lines.
pub fn render_resources(resources: &[ResourceSummary]) -> Vec<String> {
    let mut lines = vec!["Available operations:".to_string()];
    for r in resources {
        lines.push(format!("\t{}", r.name));
        lines.push(format!("\t{} {}", r.method, r.path));
        lines.push(String::new());
    }
    lines
}
