use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use tqmonitor::api::ApiClient;
use tqmonitor::config::Config;
use tqmonitor::jobs::render::{render_page, render_record, render_stats};
use tqmonitor::jobs::{
    AppState, ChainView, DetailResolver, GroupView, JobBrowser, NormalizedRecord, PageResult,
    Panel, PollingController, RequestTicket, View,
};
use tqmonitor::{telemetry, MonitorError};

mod commands;
use commands::{Command, HELP};

/// Results of user-initiated fetches, each tagged with the ticket it was
/// issued under.
enum Event {
    Page(RequestTicket, Result<PageResult, MonitorError>),
    Detail(RequestTicket, Result<NormalizedRecord, MonitorError>),
    Chain(RequestTicket, Result<ChainView, MonitorError>),
    Group(RequestTicket, Result<GroupView, MonitorError>),
}

struct Console {
    cfg: Config,
    browser: JobBrowser,
    resolver: DetailResolver,
    poller: PollingController,
    state: AppState,
    events: mpsc::UnboundedSender<Event>,
    last_chain: String,
    last_group: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env()?;
    telemetry::init(cfg.log_json);

    let client = ApiClient::new(&cfg)?;
    let resolver = DetailResolver::new(client.clone());
    let browser = JobBrowser::new(client, &cfg);
    let (poller, mut updates) = PollingController::new(resolver.clone(), cfg.poll_interval());
    let (events, mut event_rx) = mpsc::unbounded_channel();

    info!(api = %cfg.api_base_url, queue = %cfg.default_queue, "tqconsole starting");

    let mut console = Console {
        state: AppState::new(browser.page_size()),
        cfg,
        browser,
        resolver,
        poller,
        events,
        last_chain: String::new(),
        last_group: String::new(),
    };

    println!("{HELP}");
    console.show(View::Dashboard);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match commands::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => console.handle(cmd),
                    Err(msg) => eprintln!("{msg}"),
                }
            }
            Some(update) = updates.recv() => {
                if console.poller.accepts(&update) {
                    console.state.apply_stats(update.snapshot);
                    if let Some(stats) = &console.state.stats {
                        print!("{}", render_stats(stats));
                    }
                }
            }
            Some(event) = event_rx.recv() => console.apply(event),
        }
    }

    console.poller.suspend();
    Ok(())
}

impl Console {
    fn show(&mut self, view: View) {
        self.state.switch_view(view);
        self.poller.on_view_change(view);
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Dashboard => {
                self.show(View::Dashboard);
                if let Some(stats) = &self.state.stats {
                    print!("{}", render_stats(stats));
                }
            }
            Command::Jobs { status, queue } => {
                self.show(View::Jobs);
                let queue = self.cfg.queue_or_default(&queue).to_string();
                self.state.jobs.reset(status, queue);
                self.load_page();
            }
            Command::Next => self.step_page(true),
            Command::Prev => self.step_page(false),
            Command::Job(id) => {
                self.show(View::Jobs);
                let ticket = self.state.begin_request(Panel::JobDetail);
                let resolver = self.resolver.clone();
                self.dispatch(async move {
                    let res = resolver.fetch_job(&id).await.map(NormalizedRecord::Job);
                    Event::Detail(ticket, res)
                });
            }
            Command::Search(id) => {
                self.show(View::Jobs);
                let ticket = self.state.begin_request(Panel::JobDetail);
                let resolver = self.resolver.clone();
                self.dispatch(async move { Event::Detail(ticket, resolver.search(&id).await) });
            }
            Command::Chain(id) => {
                self.show(View::Chains);
                self.last_chain = id;
                self.load_chain();
            }
            Command::Group(id) => {
                self.show(View::Groups);
                self.last_group = id;
                self.load_group();
            }
            Command::Refresh => match self.state.view() {
                View::Dashboard => self.poller.refresh_now(),
                View::Jobs => self.load_page(),
                View::Chains => self.load_chain(),
                View::Groups => self.load_group(),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit | Command::Empty => {}
        }
    }

    fn step_page(&mut self, forward: bool) {
        if self.state.view() != View::Jobs {
            eprintln!("next/prev only apply to the jobs view");
            return;
        }
        let moved = if forward {
            self.state.jobs.next()
        } else {
            self.state.jobs.prev()
        };
        if moved {
            self.load_page();
        } else {
            eprintln!("no more pages");
        }
    }

    fn load_page(&mut self) {
        let ticket = self.state.begin_request(Panel::JobList);
        let req = self.state.jobs.request();
        let browser = self.browser.clone();
        self.dispatch(async move { Event::Page(ticket, browser.fetch_page(&req).await) });
    }

    fn load_chain(&mut self) {
        let ticket = self.state.begin_request(Panel::Chain);
        let resolver = self.resolver.clone();
        let id = self.last_chain.clone();
        self.dispatch(async move { Event::Chain(ticket, ChainView::load(&resolver, &id).await) });
    }

    fn load_group(&mut self) {
        let ticket = self.state.begin_request(Panel::Group);
        let resolver = self.resolver.clone();
        let id = self.last_group.clone();
        self.dispatch(async move { Event::Group(ticket, GroupView::load(&resolver, &id).await) });
    }

    fn dispatch<F>(&self, fut: F)
    where
        F: std::future::Future<Output = Event> + Send + 'static,
    {
        let tx = self.events.clone();
        tokio::spawn(async move {
            // console gone means we are shutting down
            let _ = tx.send(fut.await);
        });
    }

    fn apply(&mut self, event: Event) {
        let (panel, applied) = match event {
            Event::Page(t, res) => (t.panel, self.state.apply_page(t, res)),
            Event::Detail(t, res) => (t.panel, self.state.apply_detail(t, res)),
            Event::Chain(t, res) => (t.panel, self.state.apply_chain(t, res)),
            Event::Group(t, res) => (t.panel, self.state.apply_group(t, res)),
        };
        if applied && panel.view() == self.state.view() {
            self.print_panel(panel);
        }
    }

    fn print_panel(&self, panel: Panel) {
        if let Some(msg) = self.state.message(panel) {
            eprintln!("{msg}");
            return;
        }
        let text = match panel {
            Panel::JobList => self.state.page.as_ref().map(render_page),
            Panel::JobDetail => self.state.detail.as_ref().map(render_record),
            Panel::Chain => self.state.chain.as_ref().map(ChainView::render),
            Panel::Group => self.state.group.as_ref().map(GroupView::render),
        };
        if let Some(text) = text {
            print!("{text}");
        }
    }
}
