// ── File session ──────────────────────────────────────────────────────────────
//
// A single `Session` is created at startup and owned by the host window for
// its whole lifetime.  It tracks which file (if any) the buffer belongs to and
// runs New / Open / Save / Save As against the file system.
//
// Threading:
//   • Every public method runs on the UI thread.
//   • File reads and writes run on a worker thread that only sees its own
//     path and bytes.  It queues a `Completion` and wakes the UI thread, which
//     applies it in `pump()`.
//   • At most one I/O operation is in flight; requests made meanwhile are
//     refused with `Dispatch::Busy`.

mod binding;

pub use binding::{Binding, DEFAULT_TITLE};

use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
};

use tracing::{debug, error, info, warn};

use crate::{
    error::{InkpadError, IoOp, Result},
    fileio,
    host::{Host, Picked, UiWaker},
};

/// Title of every error dialog raised by the session.
const ERROR_TITLE: &str = "Error";

/// What happened to a user request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Finished synchronously (New).
    Done,
    /// I/O is running; the result is applied by a later `pump()`.
    Started,
    /// The user cancelled the picker.  Nothing changed.
    Cancelled,
    /// Another operation is still in flight.  Nothing changed.
    Busy,
}

/// Result of a worker-thread operation, applied on the UI thread.
#[derive(Debug)]
enum Completion {
    Opened { path: PathBuf, result: Result<String> },
    Saved { path: PathBuf, result: Result<()> },
}

/// Process-wide editor session.
pub struct Session<H: Host> {
    host: H,
    binding: Binding,
    /// Directory the pickers start in; follows the last successful open/save.
    last_dir: Option<PathBuf>,
    /// Path of the in-flight read or write, if any.
    in_flight: Option<PathBuf>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    waker: Arc<dyn UiWaker>,
}

impl<H: Host> Session<H> {
    /// Start an untitled session and push the default title to the host.
    pub fn new(host: H, waker: Arc<dyn UiWaker>, last_dir: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut session = Self {
            host,
            binding: Binding::Untitled,
            last_dir,
            in_flight: None,
            tx,
            rx,
            waker,
        };
        session.host.set_title(&session.binding.display_title());
        session
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    #[cfg(test)]
    fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn last_directory(&self) -> Option<&Path> {
        self.last_dir.as_deref()
    }

    /// `true` while a read or write has not been applied yet.
    #[cfg(test)]
    fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    // ── Operations ────────────────────────────────────────────────────────────

    /// Clear the buffer and forget the file.
    pub fn new_document(&mut self) -> Dispatch {
        if self.refuse_if_busy("new") {
            return Dispatch::Busy;
        }
        self.host.set_text("");
        self.rebind(Binding::Untitled);
        info!("new untitled document");
        Dispatch::Done
    }

    /// Ask for a file and load it.
    pub fn open(&mut self) -> Dispatch {
        if self.refuse_if_busy("open") {
            return Dispatch::Busy;
        }
        match self.host.pick_open(self.last_dir.as_deref()) {
            Picked::Cancelled => {
                debug!("open cancelled");
                Dispatch::Cancelled
            }
            Picked::Path(path) => self.start_read(path),
        }
    }

    /// Write to the bound file, or ask where to save when untitled.
    pub fn save(&mut self) -> Dispatch {
        if self.refuse_if_busy("save") {
            return Dispatch::Busy;
        }
        match self.binding.path().map(Path::to_path_buf) {
            Some(path) => self.start_write(path),
            None => self.save_as(),
        }
    }

    /// Always ask where to save, then write there.
    pub fn save_as(&mut self) -> Dispatch {
        if self.refuse_if_busy("save as") {
            return Dispatch::Busy;
        }
        let suggested = self.binding.suggested_name();
        match self.host.pick_save(self.last_dir.as_deref(), &suggested) {
            Picked::Cancelled => {
                debug!("save as cancelled");
                Dispatch::Cancelled
            }
            Picked::Path(path) => self.start_write(path),
        }
    }

    // ── Completion handling ───────────────────────────────────────────────────

    /// Apply every queued completion.  Call on the UI thread after a wake.
    ///
    /// Returns the number of completions applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Block until the in-flight operation, if any, has been applied.
    #[cfg(test)]
    fn wait_idle(&mut self) {
        while self.in_flight.is_some() {
            // `self.tx` keeps the channel open, so `recv` only returns once a
            // worker has sent.
            match self.rx.recv() {
                Ok(completion) => self.apply(completion),
                Err(_) => break,
            }
        }
    }

    fn apply(&mut self, completion: Completion) {
        self.in_flight = None;
        match completion {
            Completion::Opened { path, result } => match result {
                Ok(text) => {
                    info!(path = %path.display(), bytes = text.len(), "opened");
                    self.host.set_text(&text);
                    self.remember_dir(&path);
                    self.rebind(Binding::Bound(path));
                }
                Err(e) => self.report("Failed to open file", &e),
            },
            Completion::Saved { path, result } => match result {
                Ok(()) => {
                    info!(path = %path.display(), "saved");
                    self.remember_dir(&path);
                    self.rebind(Binding::Bound(path));
                }
                Err(e) => self.report("Failed to save file", &e),
            },
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn refuse_if_busy(&self, what: &str) -> bool {
        if let Some(path) = &self.in_flight {
            warn!(request = what, in_flight = %path.display(), "request refused, I/O in flight");
            return true;
        }
        false
    }

    fn start_read(&mut self, path: PathBuf) -> Dispatch {
        debug!(path = %path.display(), "reading");
        let job_path = path.clone();
        self.spawn(IoOp::Read, path, move || Completion::Opened {
            result: fileio::read_utf8(&job_path),
            path: job_path,
        })
    }

    fn start_write(&mut self, path: PathBuf) -> Dispatch {
        // The only copy of the buffer the session takes.
        let text = self.host.text();
        debug!(path = %path.display(), bytes = text.len(), "writing");
        let job_path = path.clone();
        self.spawn(IoOp::Write, path, move || Completion::Saved {
            result: fileio::write_atomic(&job_path, &text),
            path: job_path,
        })
    }

    /// Run `job` on a worker thread; its completion is queued and the UI
    /// thread woken.  If the thread cannot be started the failure is
    /// reported straight away.
    fn spawn<F>(&mut self, op: IoOp, path: PathBuf, job: F) -> Dispatch
    where
        F: FnOnce() -> Completion + Send + 'static,
    {
        let tx = self.tx.clone();
        let waker = Arc::clone(&self.waker);
        let spawned = thread::Builder::new()
            .name("inkpad-io".to_owned())
            .spawn(move || {
                // The receiver lives as long as the session; a send error
                // only means the window is already gone.
                if tx.send(job()).is_ok() {
                    waker.wake();
                }
            });

        match spawned {
            Ok(_) => {
                self.in_flight = Some(path);
                Dispatch::Started
            }
            Err(e) => {
                error!(error = %e, "could not start I/O worker");
                let what = match op {
                    IoOp::Read => "Failed to open file",
                    IoOp::Write | IoOp::Replace => "Failed to save file",
                };
                self.report(what, &InkpadError::io(op, path, e));
                Dispatch::Done
            }
        }
    }

    fn rebind(&mut self, binding: Binding) {
        self.binding = binding;
        self.host.set_title(&self.binding.display_title());
    }

    fn remember_dir(&mut self, path: &Path) {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.last_dir = Some(dir.to_path_buf());
        }
    }

    fn report(&mut self, what: &str, e: &InkpadError) {
        warn!(error = %e, "{what}");
        self.host.notify(ERROR_TITLE, &format!("{what}:\n{e}"));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        fs,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::host::{Notifier, Picker, TextView};

    /// Scripted host: pickers pop answers from queues, everything else is
    /// recorded.
    #[derive(Default)]
    struct FakeHost {
        text: String,
        title: String,
        open_answers: VecDeque<Picked>,
        save_answers: VecDeque<Picked>,
        open_prompts: usize,
        save_prompts: Vec<(Option<PathBuf>, String)>,
        notes: Vec<(String, String)>,
    }

    impl TextView for FakeHost {
        fn text(&self) -> String {
            self.text.clone()
        }
        fn set_text(&mut self, text: &str) {
            self.text = text.to_owned();
        }
        fn set_title(&mut self, title: &str) {
            self.title = title.to_owned();
        }
    }

    impl Picker for FakeHost {
        fn pick_open(&mut self, _start_dir: Option<&Path>) -> Picked {
            self.open_prompts += 1;
            self.open_answers.pop_front().unwrap_or(Picked::Cancelled)
        }
        fn pick_save(&mut self, start_dir: Option<&Path>, suggested_name: &str) -> Picked {
            self.save_prompts
                .push((start_dir.map(Path::to_path_buf), suggested_name.to_owned()));
            self.save_answers.pop_front().unwrap_or(Picked::Cancelled)
        }
    }

    impl Notifier for FakeHost {
        fn notify(&mut self, title: &str, message: &str) {
            self.notes.push((title.to_owned(), message.to_owned()));
        }
    }

    struct NoopWaker;

    impl UiWaker for NoopWaker {
        fn wake(&self) {}
    }

    #[derive(Default)]
    struct CountingWaker(AtomicUsize);

    impl UiWaker for CountingWaker {
        fn wake(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session() -> Session<FakeHost> {
        Session::new(FakeHost::default(), Arc::new(CountingWaker::default()), None)
    }

    fn open_path(s: &mut Session<FakeHost>, path: &Path) -> Dispatch {
        s.host_mut()
            .open_answers
            .push_back(Picked::Path(path.to_path_buf()));
        let d = s.open();
        s.wait_idle();
        d
    }

    fn save_as_path(s: &mut Session<FakeHost>, path: &Path) -> Dispatch {
        s.host_mut()
            .save_answers
            .push_back(Picked::Path(path.to_path_buf()));
        let d = s.save_as();
        s.wait_idle();
        d
    }

    #[test]
    fn starts_untitled_with_default_title() {
        let s = session();
        assert_eq!(s.binding(), &Binding::Untitled);
        assert_eq!(s.host().title, DEFAULT_TITLE);
        assert!(!s.is_busy());
    }

    #[test]
    fn new_resets_from_bound_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello").unwrap();

        let mut s = session();
        open_path(&mut s, &path);
        assert!(matches!(s.binding(), Binding::Bound(_)));

        assert_eq!(s.new_document(), Dispatch::Done);
        assert_eq!(s.binding(), &Binding::Untitled);
        assert_eq!(s.host().text, "");
        assert_eq!(s.host().title, DEFAULT_TITLE);
    }

    #[test]
    fn open_loads_content_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.txt");
        let content = "line one\r\nline two\n\u{feff}tab\there\n";
        fs::write(&path, content).unwrap();

        let mut s = session();
        assert_eq!(open_path(&mut s, &path), Dispatch::Started);

        assert_eq!(s.host().text, content);
        assert_eq!(s.binding(), &Binding::Bound(path.clone()));
        assert_eq!(s.host().title, "todo.txt");
        assert_eq!(s.last_directory(), Some(dir.path()));
        assert!(s.host().notes.is_empty());
    }

    #[test]
    fn open_cancelled_changes_nothing() {
        let mut s = session();
        s.host_mut().text = "draft".to_owned();

        assert_eq!(s.open(), Dispatch::Cancelled);
        assert!(!s.is_busy());
        assert_eq!(s.host().text, "draft");
        assert_eq!(s.binding(), &Binding::Untitled);
    }

    #[test]
    fn open_invalid_utf8_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        fs::write(&good, "keep").unwrap();
        fs::write(&bad, b"\xC3\x28 broken").unwrap();

        let mut s = session();
        open_path(&mut s, &good);
        open_path(&mut s, &bad);

        assert_eq!(s.host().text, "keep");
        assert_eq!(s.binding(), &Binding::Bound(good));
        assert_eq!(s.host().title, "good.txt");
        assert_eq!(s.host().notes.len(), 1);
        let (title, body) = &s.host().notes[0];
        assert_eq!(title, "Error");
        assert!(body.starts_with("Failed to open file:\n"), "{body}");
        assert!(body.contains("not valid UTF-8"), "{body}");
    }

    #[test]
    fn open_missing_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        open_path(&mut s, &dir.path().join("gone.txt"));

        assert_eq!(s.binding(), &Binding::Untitled);
        assert_eq!(s.host().notes.len(), 1);
        assert!(s.host().notes[0].1.contains("could not read"));
    }

    #[test]
    fn save_as_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.txt");
        let content = "α β γ\nno trailing newline";

        let mut s = session();
        s.host_mut().text = content.to_owned();
        assert_eq!(save_as_path(&mut s, &path), Dispatch::Started);
        assert_eq!(s.binding(), &Binding::Bound(path.clone()));
        assert_eq!(s.host().title, "round.txt");

        let mut fresh = session();
        open_path(&mut fresh, &path);
        assert_eq!(fresh.host().text, content);
    }

    #[test]
    fn save_untitled_with_cancelled_picker_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Session::new(
            FakeHost::default(),
            Arc::new(NoopWaker),
            Some(dir.path().to_path_buf()),
        );
        s.host_mut().text = "unsaved".to_owned();

        assert_eq!(s.save(), Dispatch::Cancelled);
        assert_eq!(s.binding(), &Binding::Untitled);
        assert_eq!(s.host().title, DEFAULT_TITLE);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        // Untitled save goes through the save picker.
        assert_eq!(
            s.host().save_prompts,
            vec![(Some(dir.path().to_path_buf()), "Untitled.txt".to_owned())]
        );
    }

    #[test]
    fn failed_save_while_untitled_stays_untitled() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("missing_dir").join("x.txt");

        let mut s = session();
        s.host_mut().text = "draft".to_owned();
        s.host_mut().save_answers.push_back(Picked::Path(blocked));
        assert_eq!(s.save(), Dispatch::Started);
        s.wait_idle();

        assert_eq!(s.binding(), &Binding::Untitled);
        assert_eq!(s.host().title, DEFAULT_TITLE);
        assert_eq!(s.host().text, "draft");
        assert_eq!(s.host().notes.len(), 1);
        assert!(s.host().notes[0].1.starts_with("Failed to save file:\n"));
    }

    #[test]
    fn save_when_bound_does_not_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "old").unwrap();

        let mut s = session();
        open_path(&mut s, &path);
        s.host_mut().text = "new".to_owned();

        assert_eq!(s.save(), Dispatch::Started);
        s.wait_idle();

        assert!(s.host().save_prompts.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(s.binding(), &Binding::Bound(path));
    }

    #[test]
    fn save_as_always_prompts_and_rebinds() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "body").unwrap();

        let mut s = session();
        open_path(&mut s, &first);
        save_as_path(&mut s, &second);

        assert_eq!(s.host().save_prompts.len(), 1);
        assert_eq!(s.host().save_prompts[0].1, "first.txt");
        assert_eq!(s.binding(), &Binding::Bound(second.clone()));
        assert_eq!(s.host().title, "second.txt");
        assert_eq!(fs::read_to_string(&second).unwrap(), "body");
    }

    #[test]
    fn failed_save_keeps_state_and_old_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "original").unwrap();
        let blocked = dir.path().join("missing_dir").join("x.txt");

        let mut s = session();
        open_path(&mut s, &path);
        s.host_mut().text = "edited".to_owned();
        save_as_path(&mut s, &blocked);

        assert_eq!(s.binding(), &Binding::Bound(path.clone()));
        assert_eq!(s.host().title, "doc.txt");
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(s.host().notes.len(), 1);
        assert!(s.host().notes[0].1.starts_with("Failed to save file:\n"));
    }

    #[test]
    fn requests_refused_while_io_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "data").unwrap();

        let mut s = session();
        s.host_mut()
            .open_answers
            .push_back(Picked::Path(path.clone()));
        assert_eq!(s.open(), Dispatch::Started);
        assert!(s.is_busy());

        assert_eq!(s.new_document(), Dispatch::Busy);
        assert_eq!(s.open(), Dispatch::Busy);
        assert_eq!(s.save(), Dispatch::Busy);
        assert_eq!(s.save_as(), Dispatch::Busy);
        // Refused requests never reach the pickers.
        assert_eq!(s.host().open_prompts, 1);
        assert!(s.host().save_prompts.is_empty());

        s.wait_idle();
        assert!(!s.is_busy());
        assert_eq!(s.host().text, "data");
    }

    #[test]
    fn worker_wakes_ui_and_pump_applies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "woken").unwrap();

        let waker = Arc::new(CountingWaker::default());
        let mut s = Session::new(FakeHost::default(), waker.clone(), None);
        s.host_mut().open_answers.push_back(Picked::Path(path));
        s.open();

        // Spin until the worker has woken us, as a message loop would.
        while waker.0.load(Ordering::SeqCst) == 0 {
            thread::yield_now();
        }
        assert_eq!(s.pump(), 1);
        assert_eq!(s.pump(), 0);
        assert_eq!(s.host().text, "woken");
        assert!(!s.is_busy());
    }
}
