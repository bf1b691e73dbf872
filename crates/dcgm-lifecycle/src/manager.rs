//! Mode dispatch for session startup.

use crate::connection::{
    Connection, EmbeddedConnection, ManagedChildConnection, StandaloneConnection, StandaloneTarget,
};
use crate::options::LifecycleOptions;
use crate::session::{release_library, Session};
use dcgm_common::{Mode, Result};
use dcgm_native::{DynamicLoader, LibraryLoader, NativeApi};
use tracing::{debug, info, warn};

/// What a mode needs before the library is loaded.
enum Startup {
    Embedded,
    Standalone(StandaloneTarget),
    ManagedChild,
}

impl Startup {
    fn plan<S: AsRef<str>>(mode: Mode, args: &[S]) -> Result<Self> {
        match mode {
            Mode::Embedded => Ok(Startup::Embedded),
            Mode::Standalone => StandaloneTarget::from_args(args).map(Startup::Standalone),
            Mode::ManagedChild => Ok(Startup::ManagedChild),
        }
    }
}

/// Starts [`Session`]s.
///
/// The loader is a type parameter so the native library can be replaced in
/// tests; production code uses the default [`DynamicLoader`].
#[derive(Debug)]
pub struct LifecycleManager<L = DynamicLoader> {
    loader: L,
    options: LifecycleOptions,
}

impl LifecycleManager<DynamicLoader> {
    pub fn new(options: LifecycleOptions) -> Self {
        Self::with_loader(DynamicLoader, options)
    }
}

impl Default for LifecycleManager<DynamicLoader> {
    fn default() -> Self {
        Self::new(LifecycleOptions::default())
    }
}

impl<L: LibraryLoader> LifecycleManager<L> {
    pub fn with_loader(loader: L, options: LifecycleOptions) -> Self {
        Self { loader, options }
    }

    pub fn options(&self) -> &LifecycleOptions {
        &self.options
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load the library and start a session in `mode`.
    ///
    /// `args` is only read in standalone mode, where it must hold the address
    /// followed by the unix-socket flag (`"0"` or `"1"`). Arguments are
    /// checked before the library is loaded. When startup fails after the
    /// load, the library is unloaded again before the error is returned.
    pub fn initialize<S: AsRef<str>>(&self, mode: Mode, args: &[S]) -> Result<Session> {
        let startup = Startup::plan(mode, args)?;

        info!("Loading {}", self.options.library);
        let native = self.loader.load(&self.options.library)?;
        debug!("Loaded {}", native.library_name());

        match self.connect(native.as_ref(), startup) {
            Ok(connection) => {
                info!(
                    "Initialized {} session (handle {})",
                    mode,
                    connection.handle()
                );
                Ok(Session::new(mode, native, connection))
            }
            Err(e) => {
                warn!("Failed to initialize {} session: {}", mode, e);
                release_library(native);
                Err(e)
            }
        }
    }

    fn connect(&self, native: &dyn NativeApi, startup: Startup) -> Result<Connection> {
        match startup {
            Startup::Embedded => EmbeddedConnection::start(native).map(Connection::Embedded),
            Startup::Standalone(target) => {
                StandaloneConnection::connect(native, &target).map(Connection::Standalone)
            }
            Startup::ManagedChild => {
                ManagedChildConnection::start(native, &self.options.hostengine)
                    .map(Connection::ManagedChild)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcgm_common::ErrorKind;
    use dcgm_native::mock::{FailPoint, MockLoader, NativeCall, MOCK_HANDLE};
    use dcgm_native::{OperationMode, DCGM_LIBRARY};

    fn manager(loader: &MockLoader) -> LifecycleManager<&MockLoader> {
        LifecycleManager::with_loader(loader, LifecycleOptions::default())
    }

    const NO_ARGS: [&str; 0] = [];

    #[test]
    fn test_default_options_load_dcgm() {
        let manager = LifecycleManager::default();
        assert_eq!(manager.options().library, DCGM_LIBRARY);
    }

    #[test]
    fn test_embedded_session_round_trip() {
        let loader = MockLoader::new();
        let session = manager(&loader).initialize(Mode::Embedded, &NO_ARGS).unwrap();
        assert_eq!(session.handle().as_raw(), MOCK_HANDLE);

        session.shutdown().unwrap();
        assert_eq!(
            loader.calls(),
            vec![
                NativeCall::Load(DCGM_LIBRARY.to_string()),
                NativeCall::Init,
                NativeCall::StartEmbedded(OperationMode::Auto),
                NativeCall::StopEmbedded(MOCK_HANDLE),
                NativeCall::Shutdown,
                NativeCall::Unload,
            ]
        );
        assert_eq!(loader.live_instances(), 0);
    }

    #[test]
    fn test_missing_library_is_reported() {
        let loader = MockLoader::missing();
        let err = manager(&loader).initialize(Mode::Embedded, &NO_ARGS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LibraryNotFound);
        assert!(err.to_string().starts_with("libdcgm.so.4 not found"));
    }

    #[test]
    fn test_bad_arguments_do_not_load_library() {
        let loader = MockLoader::new();
        let err = manager(&loader)
            .initialize(Mode::Standalone, &["localhost"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentParse);
        assert!(loader.calls().is_empty());
    }

    #[test]
    fn test_init_failure_unloads_without_shutdown() {
        let loader = MockLoader::new().fail(FailPoint::Init, -7);
        let err = manager(&loader).initialize(Mode::Embedded, &NO_ARGS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeInit);
        assert_eq!(loader.native_calls(), vec![NativeCall::Init, NativeCall::Unload]);
        assert_eq!(loader.live_instances(), 0);
    }

    #[test]
    fn test_start_failure_shuts_down_and_unloads() {
        let loader = MockLoader::new().fail(FailPoint::StartEmbedded, -3);
        let err = manager(&loader).initialize(Mode::Embedded, &NO_ARGS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NativeStart);
        assert_eq!(
            loader.native_calls(),
            vec![
                NativeCall::Init,
                NativeCall::StartEmbedded(OperationMode::Auto),
                NativeCall::Shutdown,
                NativeCall::Unload,
            ]
        );
    }
}
