use tqmonitor::jobs::StatusFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dashboard,
    Jobs { status: StatusFilter, queue: String },
    Next,
    Prev,
    Job(String),
    Search(String),
    Chain(String),
    Group(String),
    Refresh,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "commands:\n\
     \x20 dashboard                       live stats (auto refresh)\n\
     \x20 jobs [all|successful|failed]    completed jobs\n\
     \x20 jobs pending [queue]            pending jobs of a queue\n\
     \x20 next | prev                     page through jobs\n\
     \x20 job <id>                        job details\n\
     \x20 search <id>                     find a job, chain or group\n\
     \x20 chain <id> | group <id>         relation views\n\
     \x20 refresh                         reload the current view\n\
     \x20 help | quit";

/// Ids may be empty; the resolver reports the missing id inline.
pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(Command::Empty);
    };
    let first = parts.next().unwrap_or("");
    let second = parts.next().unwrap_or("");

    let cmd = match head.to_lowercase().as_str() {
        "dashboard" | "d" => Command::Dashboard,
        "jobs" | "j" => {
            let status = StatusFilter::parse(first);
            let queue = match status {
                // `jobs emails` is shorthand for `jobs pending emails`
                StatusFilter::Pending if !first.eq_ignore_ascii_case("pending") => first,
                StatusFilter::Pending => second,
                _ => "",
            };
            Command::Jobs {
                status,
                queue: queue.to_string(),
            }
        }
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "job" => Command::Job(first.to_string()),
        "search" | "s" => Command::Search(first.to_string()),
        "chain" => Command::Chain(first.to_string()),
        "group" => Command::Group(first.to_string()),
        "refresh" | "r" => Command::Refresh,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(cmd)
}
