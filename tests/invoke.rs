mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cmdvisor::{
    CommandRegistry, EXIT_CONFIG, EXIT_DISPATCH, ExecutionContext, HandlerFn, LogSettings,
    Runner, RunnerConfig, ShutdownEvents, Signal,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

use common::{FD2, Harness, raw_stderr};

/// Registry with one operation that writes `text` to fd 2 and exits with `code`.
fn writer(name: &'static str, text: &'static [u8], code: i32) -> CommandRegistry {
    CommandRegistry::builder()
        .register(name, move |_ctx: ExecutionContext| {
            HandlerFn::new(move |_args: Vec<String>| async move {
                raw_stderr(text);
                code
            })
        })
        .build()
        .unwrap()
}

fn fail() -> i32 {
    panic!("handler failure")
}

async fn eventually(mut check: impl FnMut() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn lowest_level_passes_raw_line_and_exit_code() {
    let _serial = FD2.lock().await;
    let h = Harness::to_stdout(writer("warn", b"warning: test\r\n", 7), Some("TRACE"));

    let code = h.invoke("warn", &[]).await;

    assert_eq!(code, 7);
    assert!(h.out.lines().iter().any(|l| l == "warning: test"));
    assert!(h.err.is_empty());
}

#[tokio::test]
async fn log_sink_override_takes_passing_lines_from_stdout() {
    let _serial = FD2.lock().await;
    let h = Harness::new(writer("warn", b"[WARN] routed\n", 0), Some("INFO"));

    let code = h.invoke("warn", &[]).await;

    assert_eq!(code, 0);
    assert!(h.log.lines().iter().any(|l| l == "[WARN] routed"));
    assert!(h.out.is_empty());
}

#[tokio::test]
async fn no_level_configured_discards_everything() {
    let _serial = FD2.lock().await;
    let h = Harness::new(
        writer("noisy", b"[ERROR] boom\nplain diagnostic\n", 0),
        None,
    );

    let code = h.invoke("noisy", &[]).await;

    assert_eq!(code, 0);
    assert!(h.log.is_empty());
    assert!(h.out.is_empty());
    assert!(h.err.is_empty());
}

#[tokio::test]
async fn lines_below_minimum_are_dropped() {
    let _serial = FD2.lock().await;
    let h = Harness::new(
        writer(
            "mixed",
            b"[DEBUG] a\n[INFO] b\n[WARN] c\n[error] d\n[TRACE] e\n",
            0,
        ),
        Some("warn"),
    );

    assert_eq!(h.invoke("mixed", &[]).await, 0);
    assert_eq!(h.log.lines(), vec!["[WARN] c", "[error] d"]);
}

#[tokio::test]
async fn unknown_operation_starts_nothing() {
    let _serial = FD2.lock().await;
    let built = Arc::new(AtomicBool::new(false));
    let seen = built.clone();
    let registry = CommandRegistry::builder()
        .register("apply", move |_ctx: ExecutionContext| {
            seen.store(true, Ordering::SeqCst);
            HandlerFn::new(|_args: Vec<String>| async { 0 })
        })
        .build()
        .unwrap();
    let h = Harness::new(registry, Some("TRACE"));

    let code = h.invoke("plan", &[]).await;

    assert_eq!(code, EXIT_DISPATCH);
    assert!(!built.load(Ordering::SeqCst));
    assert!(h.signals.registrations().is_empty());
    assert!(h.err.contents().contains("unknown command \"plan\""));
    assert!(h.err.contents().contains("available commands: apply"));
}

#[tokio::test]
async fn invalid_level_runs_no_handler() {
    let _serial = FD2.lock().await;
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let registry = CommandRegistry::builder()
        .register("apply", move |_ctx: ExecutionContext| {
            counter.fetch_add(1, Ordering::SeqCst);
            HandlerFn::new(|_args: Vec<String>| async { 0 })
        })
        .build()
        .unwrap();
    let h = Harness::new(registry, Some("VERBOSE"));

    let code = h.invoke("apply", &[]).await;

    assert_eq!(code, EXIT_CONFIG);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(h.signals.registrations().is_empty());
    assert!(h.err.contents().contains("invalid log level \"VERBOSE\""));
}

#[cfg(unix)]
#[tokio::test]
async fn every_operation_restores_error_stream() {
    let _serial = FD2.lock().await;
    let registry = CommandRegistry::builder()
        .register("ok", |_ctx: ExecutionContext| {
            HandlerFn::new(|_args: Vec<String>| async { 0 })
        })
        .register("fail", |_ctx: ExecutionContext| {
            HandlerFn::new(|_args: Vec<String>| async {
                raw_stderr(b"[ERROR] failing\n");
                3
            })
        })
        .register("partial", |_ctx: ExecutionContext| {
            HandlerFn::new(|_args: Vec<String>| async {
                raw_stderr(b"no trailing newline");
                0
            })
        })
        .build()
        .unwrap();
    let h = Harness::new(registry.clone(), Some("INFO"));

    for name in registry.names() {
        let before = common::stderr_identity();
        h.invoke(name, &[]).await;
        assert_eq!(common::stderr_identity(), before, "operation {name}");
    }
    let before = common::stderr_identity();
    h.invoke("missing", &[]).await;
    assert_eq!(common::stderr_identity(), before);

    assert!(h.log.lines().iter().any(|l| l == "no trailing newline"));
}

#[tokio::test]
async fn each_forwarded_signal_reaches_handler_in_order() {
    let _serial = FD2.lock().await;
    let (ack_tx, mut ack_rx) = mpsc::unbounded_channel::<usize>();
    let registry = CommandRegistry::builder()
        .register("serve", move |ctx: ExecutionContext| {
            let ack = ack_tx.clone();
            HandlerFn::new(move |_args: Vec<String>| {
                let events = ctx.shutdown().clone();
                let ack = ack.clone();
                async move {
                    let mut seen = 0;
                    while seen < 3 {
                        if events.recv().await.is_none() {
                            return 1;
                        }
                        seen += 1;
                        let _ = ack.send(seen);
                    }
                    0
                }
            })
        })
        .build()
        .unwrap();
    let h = Harness::new(registry, None);

    let driver = async {
        eventually(|| h.signals.live_listeners() == 3).await;
        let mut order = Vec::new();
        for signal in [Signal::Terminate, Signal::Interrupt, Signal::Terminate] {
            assert_eq!(h.signals.raise(Signal::Hangup), 1);
            assert_eq!(h.signals.raise(signal), 1);
            let n = timeout(Duration::from_secs(2), ack_rx.recv())
                .await
                .unwrap()
                .unwrap();
            order.push(n);
        }
        order
    };

    let (code, order) = tokio::join!(h.invoke("serve", &[]), driver);

    assert_eq!(code, 0);
    assert_eq!(order, vec![1, 2, 3]);
    assert_eq!(
        h.signals.registrations(),
        vec![Signal::Hangup, Signal::Terminate, Signal::Interrupt]
    );
}

#[tokio::test]
async fn subscription_is_cancelled_after_invoke() {
    let _serial = FD2.lock().await;
    let leftover: Arc<Mutex<Option<ShutdownEvents>>> = Arc::default();
    let slot = leftover.clone();
    let registry = CommandRegistry::builder()
        .register("keep", move |ctx: ExecutionContext| {
            *slot.lock().unwrap() = Some(ctx.shutdown().clone());
            HandlerFn::new(|_args: Vec<String>| async { 0 })
        })
        .build()
        .unwrap();
    let h = Harness::new(registry, None);

    assert_eq!(h.invoke("keep", &[]).await, 0);

    assert_eq!(h.signals.live_listeners(), 0);
    assert_eq!(h.signals.raise(Signal::Terminate), 0);
    let events = leftover.lock().unwrap().take().unwrap();
    let got = timeout(Duration::from_secs(1), events.recv()).await.unwrap();
    assert_eq!(got, None);
}

#[tokio::test]
async fn log_path_receives_passing_lines() {
    let _serial = FD2.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cmdvisor.log");
    std::fs::write(&path, "previous run\n").unwrap();

    let mut cfg = RunnerConfig::new("it");
    cfg.plugin_dir = None;
    let runner = Runner::builder(cfg, writer("log", b"[INFO] to file\n[DEBUG] hidden\n", 0))
        .with_signal_source(Arc::new(cmdvisor::ManualSignals::new()))
        .with_log_settings(LogSettings {
            level: Some("INFO".into()),
            path: Some(path.clone()),
        })
        .build();

    let code = runner
        .invoke(
            "log",
            None,
            vec![],
            cmdvisor::Sink::discard(),
            cmdvisor::Sink::discard(),
        )
        .await;

    assert_eq!(code, 0);
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("previous run\n"));
    assert!(written.contains("[INFO] to file\n"));
    assert!(!written.contains("hidden"));
}

#[tokio::test]
async fn unopenable_log_path_is_config_error() {
    let _serial = FD2.lock().await;
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = RunnerConfig::new("it");
    cfg.plugin_dir = None;
    let runner = Runner::builder(cfg, writer("log", b"", 0))
        .with_signal_source(Arc::new(cmdvisor::ManualSignals::new()))
        .with_log_settings(LogSettings {
            level: Some("INFO".into()),
            path: Some(dir.path().join("missing").join("x.log")),
        })
        .build();
    let err = cmdvisor::Capture::new();

    let code = runner
        .invoke("log", None, vec![], cmdvisor::Sink::discard(), err.sink())
        .await;

    assert_eq!(code, EXIT_CONFIG);
    assert!(err.contents().contains("cannot open log sink"));
}

#[tokio::test]
async fn working_dir_override_reaches_handler() {
    let _serial = FD2.lock().await;
    let registry = CommandRegistry::builder()
        .register("pwd", |ctx: ExecutionContext| {
            HandlerFn::new(move |_args: Vec<String>| {
                let ctx = ctx.clone();
                async move {
                    let path = ctx.resolve_path("main.tf");
                    ctx.ui().output(&path.display().to_string());
                    0
                }
            })
        })
        .build()
        .unwrap();
    let h = Harness::new(registry, None);

    let code = h
        .runner
        .invoke(
            "pwd",
            Some("/work/env".into()),
            vec![],
            h.out.sink(),
            h.err.sink(),
        )
        .await;

    assert_eq!(code, 0);
    assert_eq!(h.out.lines(), vec!["/work/env/main.tf"]);
}

#[cfg(unix)]
#[tokio::test]
async fn handler_panic_still_releases_resources() {
    let _serial = FD2.lock().await;
    let registry = CommandRegistry::builder()
        .register("boom", |_ctx: ExecutionContext| {
            HandlerFn::new(|_args: Vec<String>| async {
                raw_stderr(b"[ERROR] about to fail\n");
                fail()
            })
        })
        .build()
        .unwrap();
    let h = Arc::new(Harness::new(registry, Some("ERROR")));
    let before = common::stderr_identity();

    let task = {
        let h = h.clone();
        tokio::spawn(async move { h.invoke("boom", &[]).await })
    };
    let joined = task.await;

    assert!(joined.unwrap_err().is_panic());
    assert_eq!(common::stderr_identity(), before);
    assert!(h.log.lines().iter().any(|l| l == "[ERROR] about to fail"));
    eventually(|| h.signals.live_listeners() == 0).await;
}

#[cfg(unix)]
#[tokio::test]
async fn lingering_child_does_not_block_invoke() {
    use std::process::{Child, Command, Stdio};
    use std::time::Instant;

    let _serial = FD2.lock().await;
    let slot: Arc<Mutex<Option<Child>>> = Arc::new(Mutex::new(None));
    let registry = {
        let slot = slot.clone();
        CommandRegistry::builder()
            .register("spawn", move |_ctx: ExecutionContext| {
                let slot = slot.clone();
                HandlerFn::new(move |_args: Vec<String>| {
                    let slot = slot.clone();
                    async move {
                        raw_stderr(b"[ERROR] spawning\n");
                        let child = Command::new("sleep")
                            .arg("5")
                            .stdout(Stdio::null())
                            .spawn()
                            .unwrap();
                        *slot.lock().unwrap() = Some(child);
                        0
                    }
                })
            })
            .build()
            .unwrap()
    };
    let h = Harness::new(registry, Some("ERROR"));
    let before = common::stderr_identity();

    let started = Instant::now();
    let code = h.invoke("spawn", &[]).await;
    let took = started.elapsed();

    if let Some(mut child) = slot.lock().unwrap().take() {
        let _ = child.kill();
        let _ = child.wait();
    }
    assert_eq!(code, 0);
    assert!(took < Duration::from_secs(2), "invoke blocked for {took:?}");
    assert_eq!(common::stderr_identity(), before);
    assert!(h.log.lines().iter().any(|l| l == "[ERROR] spawning"));
}
