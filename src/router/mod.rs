//! # Router
//!
//! The orchestrator. Classifies incoming events, drives a navigation through
//! fetch → head merge → body swap → scripts → scroll, broadcasts lifecycle
//! signals, and keeps prefetching armed.
//!
//! ```text
//! BrowserEvent ─► classify ─► reconstruct ─┬─► FetchStarted
//!                                          ├─► history push (not for popstate)
//!                                          ├─► fetch ─► FetchProgress × n
//!                                          ├─► stale? ─► discard
//!                                          ├─► merge head, swap body, run scripts, scroll
//!                                          ├─► NavigationEnded
//!                                          └─► re-arm prefetch after 200ms
//! ```
//!
//! ## Overlapping navigations
//!
//! Nothing serializes navigations: a click while a page is still loading
//! starts a second fetch. Each attempt takes a sequence number, and only the
//! newest one may touch the document. Older results are dropped as
//! [`NavigationOutcome::Superseded`].

mod event;
pub mod prefetch;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use tokio::sync::{broadcast, mpsc};

use crate::core::config::RouterOptions;
use crate::core::route::{self, ClickEvent, RouteChange, RouteKind};
use crate::core::state::{NavigationOutcome, RouterPhase};
use crate::dom::body::{self, LoggingScriptHost, ScriptHost};
use crate::dom::head;
use crate::dom::{DocumentError, NodePath, Window};
use crate::fetch::{self, FetchError, ReadError, Transport};

pub use event::{BrowserEvent, RouterEvent};
use prefetch::{PrefetchState, VisibilityAction};

/// Delay before re-arming prefetch after a navigation, so links rendered by
/// the new page's scripts are picked up.
pub const PREFETCH_REARM_DELAY: Duration = Duration::from_millis(200);

const EVENT_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum NavigationError {
    Fetch(FetchError),
    Document(DocumentError),
    InvalidUrl(url::ParseError),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::Fetch(e) => write!(f, "fetch failed: {e}"),
            NavigationError::Document(e) => write!(f, "bad document: {e}"),
            NavigationError::InvalidUrl(e) => write!(f, "invalid url: {e}"),
        }
    }
}

impl std::error::Error for NavigationError {}

impl From<ReadError> for NavigationError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::Fetch(e) => NavigationError::Fetch(e),
            ReadError::Document(e) => NavigationError::Document(e),
        }
    }
}

struct Inner {
    options: RouterOptions,
    window: Arc<Mutex<Window>>,
    transport: Arc<dyn Transport>,
    scripts: Arc<dyn ScriptHost>,
    events: broadcast::Sender<RouterEvent>,
    enabled: AtomicBool,
    /// Last sequence number handed out.
    sequence: AtomicU64,
    phase: Mutex<RouterPhase>,
    prefetch: Mutex<PrefetchState>,
}

/// Cheaply cloneable handle; clones share one router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Router {
    pub fn new(window: Window, transport: Arc<dyn Transport>, options: RouterOptions) -> Self {
        Self::with_script_host(window, transport, Arc::new(LoggingScriptHost), options)
    }

    /// Builds a router and attaches it. If the window has no history support
    /// the router is permanently disabled and every operation is a no-op.
    pub fn with_script_host(
        window: Window,
        transport: Arc<dyn Transport>,
        scripts: Arc<dyn ScriptHost>,
        options: RouterOptions,
    ) -> Self {
        let supported = window.history_supported;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let router = Self {
            inner: Arc::new(Inner {
                options,
                window: Arc::new(Mutex::new(window)),
                transport,
                scripts,
                events,
                enabled: AtomicBool::new(supported),
                sequence: AtomicU64::new(0),
                phase: Mutex::new(RouterPhase::Idle),
                prefetch: Mutex::new(PrefetchState::new()),
            }),
        };

        if supported {
            router.prefetch();
        } else {
            warn!("blaze router not supported in this environment");
        }
        router
    }

    pub fn options(&self) -> RouterOptions {
        self.inner.options
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> RouterPhase {
        *lock(&self.inner.phase)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.inner.events.subscribe()
    }

    /// Locks the window for inspection or host-side edits. Do not hold the
    /// guard across an `.await`.
    pub fn window(&self) -> MutexGuard<'_, Window> {
        lock(&self.inner.window)
    }

    /// Every URL prefetched so far, sorted.
    pub fn prefetched(&self) -> Vec<String> {
        let state = lock(&self.inner.prefetch);
        let mut urls: Vec<String> = state.prefetched().map(str::to_string).collect();
        urls.sort();
        urls
    }

    pub fn is_prefetched(&self, url: &str) -> bool {
        lock(&self.inner.prefetch).is_prefetched(url)
    }

    fn diag(&self, args: fmt::Arguments<'_>) {
        if self.inner.options.log {
            info!("{args}");
        }
    }

    fn emit(&self, event: RouterEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn is_current(&self, seq: u64) -> bool {
        self.inner.sequence.load(Ordering::SeqCst) == seq
    }

    fn set_phase(&self, phase: RouterPhase) {
        *lock(&self.inner.phase) = phase;
    }

    // ========================================================================
    // Public navigation operations
    // ========================================================================

    /// Navigates to `path` (resolved against the current origin). Returns
    /// true only if the new page is now displayed.
    pub async fn go(&self, path: &str) -> bool {
        let change = route::classify_go(&self.window(), path);
        match change {
            Ok(change) => self.reconstruct(change).await.is_success(),
            Err(e) => {
                warn!("Cannot navigate to {path:?}: {}", NavigationError::InvalidUrl(e));
                false
            }
        }
    }

    pub async fn back(&self) -> NavigationOutcome {
        self.traverse(-1).await
    }

    pub async fn forward(&self) -> NavigationOutcome {
        self.traverse(1).await
    }

    async fn traverse(&self, delta: isize) -> NavigationOutcome {
        if !self.is_enabled() {
            self.diag(format_args!("router disabled"));
            return NavigationOutcome::Disabled;
        }
        let moved = self.window().history.go(delta).is_some();
        if !moved {
            debug!("No history entry at offset {delta}");
            return NavigationOutcome::Ignored;
        }
        self.on_pop().await
    }

    pub async fn on_click(&self, event: &mut ClickEvent) -> NavigationOutcome {
        if !self.is_enabled() {
            return NavigationOutcome::Disabled;
        }
        let change = route::classify_click(&mut self.window(), event);
        self.reconstruct(change).await
    }

    pub async fn on_pop(&self) -> NavigationOutcome {
        if !self.is_enabled() {
            return NavigationOutcome::Disabled;
        }
        let change = route::classify_pop(&self.window());
        self.reconstruct(change).await
    }

    /// Routes one environment event.
    pub async fn dispatch(&self, event: BrowserEvent) -> NavigationOutcome {
        match event {
            BrowserEvent::Click(mut click) => self.on_click(&mut click).await,
            BrowserEvent::PopState => self.on_pop().await,
            BrowserEvent::PointerEnter(target) => {
                self.on_pointer_enter(&target);
                NavigationOutcome::Ignored
            }
            BrowserEvent::Intersection { target, ratio } => {
                self.on_intersection(&target, ratio);
                NavigationOutcome::Ignored
            }
        }
    }

    /// Consumes events until the channel closes. Each event runs as its own
    /// task, so a slow navigation does not hold up the next click.
    pub async fn run(self, mut events: mpsc::Receiver<BrowserEvent>) {
        while let Some(event) = events.recv().await {
            let router = self.clone();
            tokio::spawn(async move {
                router.dispatch(event).await;
            });
        }
        debug!("Event channel closed, router loop exiting");
    }

    /// Unregisters all listeners and disconnects the visibility watcher. The
    /// router is inert afterwards.
    pub fn teardown(&self) {
        self.inner.enabled.store(false, Ordering::SeqCst);
        lock(&self.inner.prefetch).teardown();
        info!("Router torn down");
    }

    // ========================================================================
    // Reconstruction
    // ========================================================================

    /// Runs a classified route change to completion.
    pub async fn reconstruct(&self, change: RouteChange) -> NavigationOutcome {
        if !self.is_enabled() {
            self.diag(format_args!("router disabled"));
            return NavigationOutcome::Disabled;
        }

        let kind = change.kind();
        self.diag(format_args!("⚡ {kind}"));
        if !change.is_navigation() {
            return NavigationOutcome::Ignored;
        }
        let Some(next) = change.next().map(str::to_string) else {
            return NavigationOutcome::Ignored;
        };

        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        self.set_phase(RouterPhase::Navigating);
        self.emit(RouterEvent::FetchStarted);

        if kind != RouteKind::PopState
            && let Err(e) = self.window().push_if_changed(&next)
        {
            warn!("Could not push history for {next}: {e}");
        }

        match self.navigate(&change, &next, seq).await {
            Ok(NavigationOutcome::Completed) => {
                self.emit(RouterEvent::NavigationEnded);
                self.schedule_prefetch();
                if self.is_current(seq) {
                    self.set_phase(RouterPhase::Idle);
                }
                self.diag(format_args!("⏱️ {next} in {:?}", started.elapsed()));
                NavigationOutcome::Completed
            }
            Ok(outcome) => {
                debug!("Navigation #{seq} to {next} ended as {outcome:?}");
                outcome
            }
            Err(e) if !self.is_current(seq) => {
                debug!("Navigation #{seq} to {next} failed after being superseded: {e}");
                NavigationOutcome::Superseded
            }
            Err(e) => {
                self.set_phase(RouterPhase::Error);
                self.emit(RouterEvent::NavigationError {
                    error: e.to_string(),
                });
                self.diag(format_args!("⏱️ {next} failed after {:?}", started.elapsed()));
                error!("💥 router fetch failed: {e}");
                if self.is_current(seq) {
                    self.set_phase(RouterPhase::Idle);
                }
                NavigationOutcome::Failed
            }
        }
    }

    async fn navigate(
        &self,
        change: &RouteChange,
        next: &str,
        seq: u64,
    ) -> Result<NavigationOutcome, NavigationError> {
        let response = self
            .inner
            .transport
            .fetch(next)
            .await
            .map_err(NavigationError::Fetch)?;

        let events = self.inner.events.clone();
        let document = fetch::read_document(response, |progress| {
            let _ = events.send(RouterEvent::FetchProgress(progress.summary()));
        })
        .await?;

        if !self.is_current(seq) {
            info!("Discarding navigation #{seq} to {next}: superseded");
            return Ok(NavigationOutcome::Superseded);
        }
        if !self.is_enabled() {
            self.set_phase(RouterPhase::Idle);
            return Ok(NavigationOutcome::Disabled);
        }

        let kind = change.kind();
        let scroll_id = change.scroll_id().map(str::to_string);
        let scripts = Arc::clone(&self.inner.scripts);
        {
            let mut guard = self.window();
            let window: &mut Window = &mut guard;

            head::merge_head(&mut window.document.head, &document.head);

            let swap = move |w: &mut Window| {
                body::replace_body(&mut w.document, document);
                body::run_scripts(&mut w.document, scripts.as_ref());
                w.scroll_after_navigation(kind, scroll_id.as_deref());
            };
            if self.inner.options.page_transitions && window.transitions_supported {
                window.start_transition(swap);
            } else {
                swap(window);
            }
        }
        lock(&self.inner.prefetch).forget_targets();

        Ok(NavigationOutcome::Completed)
    }

    // ========================================================================
    // Prefetching
    // ========================================================================

    /// Arms the configured prefetch strategy for the links currently on the
    /// page. Returns how many links were armed.
    pub fn prefetch(&self) -> usize {
        let Some(strategy) = self.inner.options.prefetch else {
            return 0;
        };
        if !self.is_enabled() {
            return 0;
        }
        let window = self.window();
        lock(&self.inner.prefetch).arm(strategy, &window)
    }

    fn schedule_prefetch(&self) {
        if self.inner.options.prefetch.is_none() {
            return;
        }
        let router = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(PREFETCH_REARM_DELAY).await;
            router.prefetch();
        });
    }

    fn on_pointer_enter(&self, target: &NodePath) {
        if !self.is_enabled() {
            return;
        }
        let Some(url) = prefetch::link_target(&self.window(), target) else {
            return;
        };
        let armed = lock(&self.inner.prefetch).take_hover(&url);
        if let Some(url) = armed {
            self.issue_prefetch(url);
        }
    }

    fn on_intersection(&self, target: &NodePath, ratio: f64) {
        if !self.is_enabled() {
            return;
        }
        let Some(url) = prefetch::link_target(&self.window(), target) else {
            return;
        };
        let action = lock(&self.inner.prefetch).on_visibility(&url, ratio);
        match action {
            VisibilityAction::Prefetch(url) => self.issue_prefetch(url),
            VisibilityAction::Unobserved => debug!("{url} already prefetched, unobserved"),
            VisibilityAction::Nothing => {}
        }
    }

    /// Adds a prefetch hint for `url` and warms it in the background. Repeat
    /// requests for the same URL are dropped.
    pub fn issue_prefetch(&self, url: String) {
        if !lock(&self.inner.prefetch).record(&url) {
            return;
        }
        prefetch::insert_hint(&mut self.window().document.head, &url);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime, prefetch hint for {url} added without warming");
            return;
        };
        let transport = Arc::clone(&self.inner.transport);
        let log = self.inner.options.log;
        handle.spawn(async move {
            match fetch::fetch_document(transport.as_ref(), &url).await {
                Ok(_) if log => info!("🌩️ prefetched {url}"),
                Ok(_) => debug!("prefetched {url}"),
                Err(e) if log => info!("🤕 can't prefetch {url}: {e}"),
                Err(e) => debug!("can't prefetch {url}: {e}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PrefetchStrategy;
    use crate::core::route::Modifiers;
    use crate::dom::ScrollPosition;
    use crate::test_support::{
        FailingTransport, GatedTransport, RecordingScriptHost, SiteTransport, page, window_at,
    };

    const HOME: &str = "https://ex.com/";

    fn home_page() -> String {
        page(
            "Home",
            r##"<a id="about" href="/about">About</a><a id="blog" href="/blog/#latest">Blog</a>
                <a id="jump" href="#top">Top</a><h2 id="top">Home</h2><main>home</main>"##,
        )
    }

    fn site() -> SiteTransport {
        SiteTransport::default()
            .with_page(HOME, &home_page())
            .with_page(
                "https://ex.com/about/",
                &page(
                    "About",
                    r#"<main>about</main><a id="next" href="/next">Next</a><script>track()</script>"#,
                ),
            )
            .with_page(
                "https://ex.com/blog/#latest",
                &page("Blog", r#"<h2 id="latest">Latest</h2>"#),
            )
    }

    fn router_with(transport: Arc<dyn Transport>, options: RouterOptions) -> Router {
        Router::new(window_at(HOME, &home_page()), transport, options)
    }

    fn click_on(router: &Router, id: &str) -> ClickEvent {
        let path = router
            .window()
            .document
            .body
            .locate(&|el| el.attr("id") == Some(id))
            .unwrap();
        ClickEvent::new(path)
    }

    fn drain(rx: &mut broadcast::Receiver<RouterEvent>) -> Vec<RouterEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_go_renders_next_page() {
        let host = Arc::new(RecordingScriptHost::default());
        let router = Router::with_script_host(
            window_at(HOME, &home_page()),
            Arc::new(site()),
            host.clone(),
            RouterOptions::default(),
        );
        let mut rx = router.subscribe();

        assert!(router.go("/about").await);

        let window = router.window();
        assert_eq!(window.document.title().as_deref(), Some("About"));
        assert_eq!(window.location().as_str(), "https://ex.com/about/");
        assert_eq!(window.scroll, ScrollPosition::Top);
        drop(window);

        assert_eq!(host.scripts().len(), 1);
        assert_eq!(router.phase(), RouterPhase::Idle);

        let events = drain(&mut rx);
        assert_eq!(events.first(), Some(&RouterEvent::FetchStarted));
        assert_eq!(events.last(), Some(&RouterEvent::NavigationEnded));
        let progress: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RouterEvent::FetchProgress(p) => Some(p.received),
                _ => None,
            })
            .collect();
        assert_eq!(progress.len(), 2);
        assert!(progress[0] < progress[1]);
    }

    #[tokio::test]
    async fn test_link_click_scrolls_to_fragment() {
        let router = router_with(Arc::new(site()), RouterOptions::default());
        let mut click = click_on(&router, "blog");
        assert_eq!(router.on_click(&mut click).await, NavigationOutcome::Completed);
        assert!(click.default_prevented());
        assert_eq!(
            router.window().scroll,
            ScrollPosition::Element {
                id: "#latest".into(),
                smooth: true
            }
        );
    }

    #[tokio::test]
    async fn test_same_page_is_ignored() {
        let transport = Arc::new(site());
        let router = router_with(transport.clone(), RouterOptions::default());
        assert_eq!(
            router
                .reconstruct(RouteChange::Go {
                    next: HOME.into(),
                    prev: HOME.into()
                })
                .await,
            NavigationOutcome::Ignored
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failure_emits_one_error_and_keeps_body() {
        let router = router_with(Arc::new(FailingTransport), RouterOptions::default());
        let before = router.window().document.body.clone();
        let mut rx = router.subscribe();

        assert!(!router.go("/about").await);

        let errors = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, RouterEvent::NavigationError { .. }))
            .count();
        assert_eq!(errors, 1);
        assert_eq!(router.window().document.body, before);
        assert_eq!(router.phase(), RouterPhase::Idle);
        // History was pushed before the fetch failed.
        assert_eq!(router.window().location().as_str(), "https://ex.com/about/");
    }

    #[tokio::test]
    async fn test_back_and_forward_pop() {
        let transport = Arc::new(site());
        let router = router_with(transport.clone(), RouterOptions::default());
        assert!(router.go("/about").await);

        assert_eq!(router.back().await, NavigationOutcome::Completed);
        assert_eq!(router.window().document.title().as_deref(), Some("Home"));
        assert_eq!(router.window().history.len(), 2);

        assert_eq!(router.forward().await, NavigationOutcome::Completed);
        assert_eq!(router.window().document.title().as_deref(), Some("About"));
        assert_eq!(router.forward().await, NavigationOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_unsupported_environment_disables_router() {
        let mut window = window_at(HOME, &home_page());
        window.history_supported = false;
        let transport = Arc::new(site());
        let router = Router::new(window, transport.clone(), RouterOptions::default());

        assert!(!router.is_enabled());
        assert!(!router.go("/about").await);
        let mut click = click_on(&router, "about");
        assert_eq!(router.on_click(&mut click).await, NavigationOutcome::Disabled);
        assert!(!click.default_prevented());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_superseded_navigation_is_discarded() {
        let transport = Arc::new(GatedTransport::new(site(), "https://ex.com/about/"));
        let router = router_with(transport.clone(), RouterOptions::default());
        let mut rx = router.subscribe();

        let slow = tokio::spawn({
            let router = router.clone();
            async move {
                router
                    .reconstruct(RouteChange::Go {
                        next: "https://ex.com/about/".into(),
                        prev: HOME.into(),
                    })
                    .await
            }
        });
        while router.phase() != RouterPhase::Navigating {
            tokio::task::yield_now().await;
        }

        assert!(router.go("/blog/#latest").await);
        transport.release();
        assert_eq!(slow.await.unwrap(), NavigationOutcome::Superseded);

        assert_eq!(router.window().document.title().as_deref(), Some("Blog"));
        let ended = drain(&mut rx)
            .into_iter()
            .filter(|e| *e == RouterEvent::NavigationEnded)
            .count();
        assert_eq!(ended, 1);
    }

    #[tokio::test]
    async fn test_superseded_failure_stays_silent() {
        let transport = Arc::new(GatedTransport::new(site(), "https://ex.com/dead/"));
        let router = router_with(transport.clone(), RouterOptions::default());
        let mut rx = router.subscribe();

        let slow = tokio::spawn({
            let router = router.clone();
            async move { router.go("/dead").await }
        });
        while router.phase() != RouterPhase::Navigating {
            tokio::task::yield_now().await;
        }

        assert!(router.go("/about").await);
        transport.release();
        assert!(!slow.await.unwrap());

        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&RouterEvent::NavigationEnded));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, RouterEvent::NavigationError { .. }))
        );
        assert_eq!(router.window().document.title().as_deref(), Some("About"));
        assert_eq!(router.phase(), RouterPhase::Idle);
    }

    #[tokio::test]
    async fn test_teardown_mid_fetch_returns_to_idle() {
        let transport = Arc::new(GatedTransport::new(site(), "https://ex.com/about/"));
        let router = router_with(transport.clone(), RouterOptions::default());

        let slow = tokio::spawn({
            let router = router.clone();
            async move {
                router
                    .reconstruct(RouteChange::Go {
                        next: "https://ex.com/about/".into(),
                        prev: HOME.into(),
                    })
                    .await
            }
        });
        while router.phase() != RouterPhase::Navigating {
            tokio::task::yield_now().await;
        }

        router.teardown();
        transport.release();
        assert_eq!(slow.await.unwrap(), NavigationOutcome::Disabled);
        assert_eq!(router.phase(), RouterPhase::Idle);
        assert_eq!(router.window().document.title().as_deref(), Some("Home"));
    }

    #[tokio::test]
    async fn test_in_page_anchor_makes_no_request() {
        let transport = Arc::new(site());
        let router = router_with(transport.clone(), RouterOptions::default());
        let mut click = click_on(&router, "jump");

        assert_eq!(router.on_click(&mut click).await, NavigationOutcome::Ignored);
        assert!(click.default_prevented());
        assert_eq!(
            router.window().scroll,
            ScrollPosition::Element {
                id: "#top".into(),
                smooth: true
            }
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_shift_click_makes_no_request() {
        let transport = Arc::new(site());
        let router = router_with(transport.clone(), RouterOptions::default());
        let mut click = click_on(&router, "about").with_modifiers(Modifiers {
            shift: true,
            ..Default::default()
        });

        assert_eq!(router.on_click(&mut click).await, NavigationOutcome::Ignored);
        assert!(!click.default_prevented());
        assert!(transport.requests().is_empty());
        assert_eq!(router.window().history.len(), 1);
    }

    #[tokio::test]
    async fn test_prefetch_rearms_after_navigation() {
        let options = RouterOptions {
            prefetch: Some(PrefetchStrategy::Hover),
            ..Default::default()
        };
        let router = router_with(Arc::new(site()), options);
        assert!(router.go("/about").await);

        tokio::time::sleep(PREFETCH_REARM_DELAY + Duration::from_millis(100)).await;

        let target = click_on(&router, "next").target;
        router.dispatch(BrowserEvent::PointerEnter(target)).await;
        assert!(router.is_prefetched("https://ex.com/next"));
    }

    #[tokio::test]
    async fn test_page_transition_wraps_swap() {
        let options = RouterOptions {
            page_transitions: true,
            ..Default::default()
        };
        let router = router_with(Arc::new(site()), options);
        assert!(router.go("/about").await);
        assert_eq!(router.window().transitions, 1);

        let plain = router_with(Arc::new(site()), RouterOptions::default());
        assert!(plain.go("/about").await);
        assert_eq!(plain.window().transitions, 0);
    }

    #[tokio::test]
    async fn test_hover_prefetch_once() {
        let options = RouterOptions {
            prefetch: Some(PrefetchStrategy::Hover),
            ..Default::default()
        };
        let router = router_with(Arc::new(site()), options);
        let target = click_on(&router, "about").target;

        router.dispatch(BrowserEvent::PointerEnter(target.clone())).await;
        router.dispatch(BrowserEvent::PointerEnter(target)).await;

        assert_eq!(router.prefetched(), vec!["https://ex.com/about"]);
        let hints = router
            .window()
            .document
            .head
            .find_all(&head::is_prefetch_hint)
            .len();
        assert_eq!(hints, 1);
    }

    #[tokio::test]
    async fn test_visible_prefetch_after_full_view() {
        let options = RouterOptions {
            prefetch: Some(PrefetchStrategy::Visible),
            ..Default::default()
        };
        let router = router_with(Arc::new(site()), options);
        let target = click_on(&router, "about").target;

        router
            .dispatch(BrowserEvent::Intersection {
                target: target.clone(),
                ratio: 0.4,
            })
            .await;
        assert!(router.prefetched().is_empty());
        router
            .dispatch(BrowserEvent::Intersection {
                target,
                ratio: 1.0,
            })
            .await;
        assert!(router.is_prefetched("https://ex.com/about"));
    }

    #[tokio::test]
    async fn test_teardown_makes_router_inert() {
        let options = RouterOptions {
            prefetch: Some(PrefetchStrategy::Hover),
            ..Default::default()
        };
        let router = router_with(Arc::new(site()), options);
        let target = click_on(&router, "about").target;
        router.teardown();

        router.dispatch(BrowserEvent::PointerEnter(target)).await;
        assert!(router.prefetched().is_empty());
        assert_eq!(router.back().await, NavigationOutcome::Disabled);
    }
}
