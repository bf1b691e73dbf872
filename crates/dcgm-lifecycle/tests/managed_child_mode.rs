mod common;

use common::{manager, serial, wait_for, FakeHostengine, NO_ARGS};
use dcgm_lifecycle::{ErrorKind, HostengineOptions, LifecycleOptions, Mode};
use dcgm_native::mock::{FailPoint, MockLoader, NativeCall, MOCK_HANDLE};
use dcgm_native::CONNECT_V2_PARAMS_VERSION;
use dcgm_process::{force_kill, process_exists};
use std::ffi::OsString;
use std::time::Duration;

#[test]
fn test_missing_binary_touches_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let options = LifecycleOptions {
        hostengine: HostengineOptions {
            search_path: Some(OsString::from(scratch.path())),
            scratch_directory: scratch.path().to_path_buf(),
            ..HostengineOptions::default()
        },
        ..LifecycleOptions::default()
    };

    let loader = MockLoader::new();
    let err = manager(&loader, options)
        .initialize(Mode::ManagedChild, &NO_ARGS)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExecutableNotFound);
    assert!(err.to_string().starts_with("error finding nv-hostengine"));
    assert!(loader.native_calls().iter().all(|c| *c == NativeCall::Unload));
    assert_eq!(loader.live_instances(), 0);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_managed_child_start_and_stop() {
    let _guard = serial();
    let engine = FakeHostengine::new(0);
    let loader = MockLoader::new();

    let session = manager(&loader, engine.options())
        .initialize(Mode::ManagedChild, &NO_ARGS)
        .unwrap();
    let child = session.child().unwrap();
    let pid = child.pid();
    let socket = child.socket_path().to_path_buf();

    assert!(socket.starts_with(engine.scratch_dir()));
    assert!(socket.exists());
    assert_eq!(engine.socket_arg(), Some(socket.clone()));
    assert!(process_exists(pid).unwrap());
    assert_eq!(
        loader.native_calls()[..2],
        [
            NativeCall::Init,
            NativeCall::Connect {
                address: socket.display().to_string(),
                address_is_unix_socket: 1,
                version: CONNECT_V2_PARAMS_VERSION,
            },
        ]
    );

    session.shutdown().unwrap();

    assert_eq!(engine.term_calls(), 1);
    assert!(!socket.exists());
    assert!(!process_exists(pid).unwrap());
    assert_eq!(
        loader.native_calls()[2..],
        [
            NativeCall::Disconnect(MOCK_HANDLE),
            NativeCall::Shutdown,
            NativeCall::Unload,
        ]
    );
    assert_eq!(loader.live_instances(), 0);
}

#[test]
fn test_term_failure_is_returned_without_kill() {
    let _guard = serial();
    let engine = FakeHostengine::new(4);
    let loader = MockLoader::new();

    let session = manager(&loader, engine.options())
        .initialize(Mode::ManagedChild, &NO_ARGS)
        .unwrap();
    let pid = session.child().unwrap().pid();
    let socket = session.child().unwrap().socket_path().to_path_buf();

    let err = session.shutdown().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TerminationCommand);
    assert_eq!(engine.term_calls(), 1);
    assert!(!socket.exists());
    assert!(process_exists(pid).unwrap());
    assert_eq!(loader.live_instances(), 0);

    force_kill(pid).unwrap();
}

#[test]
fn test_disconnect_failure_skips_term() {
    let _guard = serial();
    let engine = FakeHostengine::new(0);
    let loader = MockLoader::new().fail(FailPoint::Disconnect, -21);

    let session = manager(&loader, engine.options())
        .initialize(Mode::ManagedChild, &NO_ARGS)
        .unwrap();
    let pid = session.child().unwrap().pid();
    let socket = session.child().unwrap().socket_path().to_path_buf();

    let err = session.shutdown().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NativeDisconnect);
    assert_eq!(engine.term_calls(), 0);
    assert!(!socket.exists());
    assert!(process_exists(pid).unwrap());

    force_kill(pid).unwrap();
}

#[test]
fn test_connect_failure_kills_child_and_removes_socket() {
    let _guard = serial();
    let engine = FakeHostengine::new(0);
    let loader = MockLoader::new().fail(FailPoint::Connect, -11);

    let err = manager(&loader, engine.options())
        .initialize(Mode::ManagedChild, &NO_ARGS)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NativeConnect);

    assert!(wait_for(Duration::from_secs(1), || {
        std::fs::read_dir(engine.scratch_dir())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .all(|entry| !entry.file_name().to_string_lossy().starts_with("dcgm"))
    }));
    assert_eq!(engine.term_calls(), 0);
    assert_eq!(loader.live_instances(), 0);
}

#[test]
fn test_unwritable_scratch_directory() {
    let _guard = serial();
    let engine = FakeHostengine::new(0);
    let mut options = engine.options();
    options.hostengine.scratch_directory = engine.scratch_dir().join("missing");

    let loader = MockLoader::new();
    let err = manager(&loader, options)
        .initialize(Mode::ManagedChild, &NO_ARGS)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ScratchFile);
    assert!(loader.native_calls().iter().all(|c| *c == NativeCall::Unload));
}
