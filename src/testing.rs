//! Recording fakes for the host, runner and renderer seams.

use crate::disposable::Disposable;
use crate::error::{ExecutionError, PanelError, RenderError};
use crate::host::{PanelHost, PanelOptions, SaveFeed, ViewColumn, WebviewPanel};
use crate::panel::{DiffPanel, PanelContext};
use crate::registry::PanelRegistry;
use crate::render::DiffHtmlRenderer;
use crate::source::{CommandRunner, RefreshSource, WatchedPath};
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::oneshot;

/// Let spawned local tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub struct FakePanelState {
    pub html: RefCell<Option<String>>,
    pub html_writes: Cell<usize>,
    pub reveals: RefCell<Vec<ViewColumn>>,
    pub dispose_calls: Cell<usize>,
    pub on_dispose_call: RefCell<Option<Box<dyn Fn()>>>,
    disposed: Cell<bool>,
    next_id: Cell<u64>,
    dispose_listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    visibility_listeners: RefCell<Vec<(u64, Rc<dyn Fn(bool)>)>>,
}

impl FakePanelState {
    pub fn html(&self) -> Option<String> {
        self.html.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.dispose_listeners.borrow().len() + self.visibility_listeners.borrow().len()
    }

    /// Simulate the user closing the panel.
    pub fn close(&self) {
        self.dispose();
    }

    pub fn set_visible(&self, visible: bool) {
        let listeners: Vec<_> = self
            .visibility_listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(visible);
        }
    }

    fn dispose(&self) {
        self.dispose_calls.set(self.dispose_calls.get() + 1);
        if let Some(record) = self.on_dispose_call.borrow().as_ref() {
            record();
        }
        if self.disposed.replace(true) {
            return;
        }
        let listeners: Vec<_> = self
            .dispose_listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

struct FakePanel(Rc<FakePanelState>);

impl WebviewPanel for FakePanel {
    fn set_html(&self, html: &str) -> Result<(), PanelError> {
        if self.0.disposed.get() {
            return Err(PanelError::Disposed);
        }
        *self.0.html.borrow_mut() = Some(html.to_string());
        self.0.html_writes.set(self.0.html_writes.get() + 1);
        Ok(())
    }

    fn reveal(&self, column: ViewColumn) {
        self.0.reveals.borrow_mut().push(column);
    }

    fn asset_uri(&self, relative: &str) -> String {
        format!("fake://media/{}", relative)
    }

    fn on_did_dispose(&self, listener: Box<dyn Fn()>) -> Disposable {
        let id = self.0.next_id();
        self.0
            .dispose_listeners
            .borrow_mut()
            .push((id, Rc::from(listener)));
        let state = Rc::downgrade(&self.0);
        Disposable::new(move || {
            if let Some(state) = state.upgrade() {
                state.dispose_listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    fn on_did_change_visibility(&self, listener: Box<dyn Fn(bool)>) -> Disposable {
        let id = self.0.next_id();
        self.0
            .visibility_listeners
            .borrow_mut()
            .push((id, Rc::from(listener)));
        let state = Rc::downgrade(&self.0);
        Disposable::new(move || {
            if let Some(state) = state.upgrade() {
                state
                    .visibility_listeners
                    .borrow_mut()
                    .retain(|(other, _)| *other != id);
            }
        })
    }

    fn dispose(&self) {
        self.0.dispose();
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub panels: RefCell<Vec<Rc<FakePanelState>>>,
    pub errors: RefCell<Vec<String>>,
    pub titles: RefCell<Vec<(String, ViewColumn)>>,
    pub fail_create: Cell<bool>,
}

impl FakeHost {
    pub fn panel(&self, index: usize) -> Rc<FakePanelState> {
        Rc::clone(&self.panels.borrow()[index])
    }

    pub fn created(&self) -> usize {
        self.panels.borrow().len()
    }
}

impl PanelHost for FakeHost {
    fn create_panel(
        &self,
        title: &str,
        column: ViewColumn,
        _options: PanelOptions,
    ) -> Result<Box<dyn WebviewPanel>, PanelError> {
        if self.fail_create.get() {
            return Err(PanelError::Host("no panels today".to_string()));
        }
        let state = Rc::new(FakePanelState::default());
        self.panels.borrow_mut().push(Rc::clone(&state));
        self.titles.borrow_mut().push((title.to_string(), column));
        Ok(Box::new(FakePanel(state)))
    }

    fn show_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

enum Scripted {
    Ready(Result<String, String>),
    Gated(oneshot::Receiver<Result<String, String>>),
}

/// Runner answering from a script of responses; an empty script yields "".
#[derive(Default)]
pub struct FakeRunner {
    pub calls: RefCell<Vec<String>>,
    script: RefCell<VecDeque<Scripted>>,
}

impl FakeRunner {
    pub fn respond(&self, response: Result<&str, &str>) {
        let response = response.map(str::to_string).map_err(str::to_string);
        self.script.borrow_mut().push_back(Scripted::Ready(response));
    }

    /// Queue a response that resolves only when the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<Result<String, String>> {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().push_back(Scripted::Gated(rx));
        tx
    }
}

fn to_execution_error(command: &str, stderr: String) -> ExecutionError {
    ExecutionError::Failed {
        command: command.to_string(),
        status: "exit status: 1".to_string(),
        stderr,
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &str) -> LocalBoxFuture<'static, Result<String, ExecutionError>> {
        self.calls.borrow_mut().push(command.to_string());
        let next = self.script.borrow_mut().pop_front();
        let command = command.to_string();

        async move {
            let response = match next {
                None => Ok(String::new()),
                Some(Scripted::Ready(response)) => response,
                Some(Scripted::Gated(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err("gate dropped".to_string())),
            };
            response.map_err(|stderr| to_execution_error(&command, stderr))
        }
        .boxed_local()
    }
}

/// Wraps the diff text in a `<pre>` without escaping.
#[derive(Default)]
pub struct StubRenderer {
    pub fail: Cell<bool>,
}

impl DiffHtmlRenderer for StubRenderer {
    fn render_fragment(&self, diff: &str) -> Result<String, RenderError> {
        if self.fail.get() {
            return Err(RenderError::UnknownTheme("stub".to_string()));
        }
        Ok(format!("<pre class=\"stub\">{}</pre>", diff))
    }
}

pub struct Fixture {
    pub host: Rc<FakeHost>,
    pub runner: Rc<FakeRunner>,
    pub renderer: Rc<StubRenderer>,
    pub feed: SaveFeed,
    pub ctx: Rc<PanelContext>,
}

impl Fixture {
    pub fn new() -> Self {
        let host = Rc::new(FakeHost::default());
        let runner = Rc::new(FakeRunner::default());
        let renderer = Rc::new(StubRenderer::default());
        let feed = SaveFeed::new();
        let ctx = Rc::new(PanelContext {
            host: Rc::clone(&host) as Rc<dyn PanelHost>,
            runner: Rc::clone(&runner) as Rc<dyn CommandRunner>,
            renderer: Rc::clone(&renderer) as Rc<dyn DiffHtmlRenderer>,
            save_feed: feed.clone(),
            title: "Diff Preview".to_string(),
        });
        Self {
            host,
            runner,
            renderer,
            feed,
            ctx,
        }
    }

    pub fn registry(&self) -> PanelRegistry {
        PanelRegistry::new(Rc::clone(&self.ctx))
    }

    pub fn create_panel(&self, source: RefreshSource, watched_path: WatchedPath) -> Rc<DiffPanel> {
        self.create_panel_with(source, watched_path, Disposable::noop())
    }

    pub fn create_panel_with(
        &self,
        source: RefreshSource,
        watched_path: WatchedPath,
        on_dispose: Disposable,
    ) -> Rc<DiffPanel> {
        DiffPanel::create(
            0,
            Rc::clone(&self.ctx),
            ViewColumn::Active,
            source,
            watched_path,
            on_dispose,
        )
        .unwrap()
    }
}
