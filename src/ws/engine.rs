//! The WebSocket message loop (spec.md §4.I steps 4-6, "Message loop",
//! "Error handling", "Cleanup"). Steps 1-3 (authenticate, bind/validate
//! params, upgrade) happen before [`serve`] is called: authentication
//! composes the same way it does for JSON routes (`auth::authenticate_with`
//! wrapping the handler that performs the upgrade), params come from
//! [`crate::bind::FromRequestParts`], and the upgrade itself is
//! [`super::handshake::accept_key`] plus whatever transport the caller
//! hands in.
use std::io;

use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ApiError;

/// A WebSocket message, exposed to callbacks as an opaque payload tagged
/// with its kind (spec.md §6: "Text/binary is exposed to callbacks as an
/// opaque byte sequence; a separate message-type value indicates the
/// kind").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }
}

/// Frame semantics are delegated to the transport adapter (spec.md §6); the
/// core only needs to send and receive whole messages and close exactly
/// once.
pub trait WebSocketTransport: Send {
    fn send(&mut self, message: WsMessage) -> io::Result<()>;
    /// `Ok(None)` signals the peer closed the connection cleanly.
    fn recv(&mut self) -> io::Result<Option<WsMessage>>;
    fn close(&mut self) -> io::Result<()>;
}

/// `(context) -> context` (spec.md §4.I "WebSocket middleware"). Runs
/// before every callback invocation; must not overwrite the connection id
/// already present in the context it's given.
pub trait WsMiddleware: Send + Sync {
    fn apply(&self, context: RequestContext) -> RequestContext;
}

impl<F> WsMiddleware for F
where
    F: Fn(RequestContext) -> RequestContext + Send + Sync,
{
    fn apply(&self, context: RequestContext) -> RequestContext {
        self(context)
    }
}

fn apply_middleware(middleware: &[Box<dyn WsMiddleware>], context: RequestContext) -> RequestContext {
    middleware.iter().fold(context, |ctx, mw| mw.apply(ctx))
}

type OnConnect<P> = Box<dyn Fn(&mut RequestContext, Uuid, &P) + Send + Sync>;
type OnMessage<P> = Box<dyn Fn(&mut RequestContext, Uuid, WsMessage, &P) -> Result<(), ApiError> + Send + Sync>;
type OnError = Box<dyn Fn(&mut RequestContext, Uuid, &ApiError) -> bool + Send + Sync>;
type OnDisconnect<P> = Box<dyn Fn(&mut RequestContext, Uuid, &P, Option<&ApiError>) + Send + Sync>;

/// The four lifecycle callbacks a WebSocket route registers (spec.md §4.I).
/// `on_message` is the only one that's required — registering a route
/// without one is a configuration error, so it's taken by [`Callbacks::new`]
/// rather than left optional.
pub struct Callbacks<P> {
    on_connect: Option<OnConnect<P>>,
    on_message: OnMessage<P>,
    on_error: Option<OnError>,
    on_disconnect: Option<OnDisconnect<P>>,
}

impl<P> Callbacks<P> {
    pub fn new<F>(on_message: F) -> Self
    where
        F: Fn(&mut RequestContext, Uuid, WsMessage, &P) -> Result<(), ApiError> + Send + Sync + 'static,
    {
        Self {
            on_connect: None,
            on_message: Box::new(on_message),
            on_error: None,
            on_disconnect: None,
        }
    }

    pub fn on_connect<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut RequestContext, Uuid, &P) + Send + Sync + 'static,
    {
        self.on_connect = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut RequestContext, Uuid, &ApiError) -> bool + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_disconnect<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut RequestContext, Uuid, &P, Option<&ApiError>) + Send + Sync + 'static,
    {
        self.on_disconnect = Some(Box::new(f));
        self
    }
}

/// Run one connection to completion (spec.md §4.I steps 4-6 onward):
/// assign a connection id, attach it to the context, run the message loop,
/// then clean up unconditionally.
///
/// Returns the detached cleanup context (spec.md §4.I "Cleanup": "Uses a
/// detached context ... with the connection id re-attached and WebSocket
/// middleware re-applied"), for a caller that wants to inspect what
/// `OnDisconnect` saw.
pub fn serve<P>(
    mut transport: Box<dyn WebSocketTransport>,
    params: &P,
    base_context: RequestContext,
    middleware: &[Box<dyn WsMiddleware>],
    callbacks: &Callbacks<P>,
) -> RequestContext {
    let connection_id = Uuid::new_v4();
    let mut base_context = base_context;
    base_context.set_ws_connection_id(connection_id);

    if let Some(on_connect) = &callbacks.on_connect {
        let mut context = apply_middleware(middleware, base_context.clone());
        on_connect(&mut context, connection_id, params);
    }

    let mut final_error: Option<ApiError> = None;
    loop {
        let mut context = apply_middleware(middleware, base_context.clone());
        let outcome = match transport.recv() {
            Ok(Some(message)) => (callbacks.on_message)(&mut context, connection_id, message, params),
            Ok(None) => break,
            Err(e) => Err(ApiError::internal(e)),
        };
        if let Err(err) = outcome {
            let should_continue = match &callbacks.on_error {
                Some(on_error) => on_error(&mut context, connection_id, &err),
                None => false,
            };
            if !should_continue {
                final_error = Some(err);
                break;
            }
        }
    }

    let _ = transport.close();

    let mut detached_context = apply_middleware(middleware, base_context.clone());
    detached_context.set_ws_connection_id(connection_id);
    if let Some(on_disconnect) = &callbacks.on_disconnect {
        on_disconnect(&mut detached_context, connection_id, params, final_error.as_ref());
    }
    detached_context
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedTransport {
        messages: Vec<WsMessage>,
        closed: bool,
    }

    impl WebSocketTransport for ScriptedTransport {
        fn send(&mut self, _message: WsMessage) -> io::Result<()> {
            Ok(())
        }
        fn recv(&mut self) -> io::Result<Option<WsMessage>> {
            if self.messages.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.messages.remove(0)))
            }
        }
        fn close(&mut self) -> io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn test_connect_message_disconnect_order() {
        let connected = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(AtomicUsize::new(0));
        let disconnected = Arc::new(AtomicUsize::new(0));
        let seen_id = Arc::new(std::sync::Mutex::new(None));

        let (c1, c2, c3) = (connected.clone(), received.clone(), disconnected.clone());
        let seen_connect = seen_id.clone();
        let seen_disconnect = seen_id.clone();

        let callbacks: Callbacks<()> = Callbacks::new(move |_ctx, _id, _msg, _params| {
            c2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .on_connect(move |_ctx, id, _params| {
            c1.fetch_add(1, Ordering::SeqCst);
            *seen_connect.lock().unwrap() = Some(id);
        })
        .on_disconnect(move |_ctx, id, _params, err| {
            c3.fetch_add(1, Ordering::SeqCst);
            assert_eq!(*seen_disconnect.lock().unwrap(), Some(id));
            assert!(err.is_none());
        });

        let transport: Box<dyn WebSocketTransport> = Box::new(ScriptedTransport {
            messages: vec![WsMessage::Text("hi".to_string())],
            closed: false,
        });

        serve(transport, &(), RequestContext::default(), &[], &callbacks);

        assert_eq!(connected.load(Ordering::SeqCst), 1);
        assert_eq!(received.load(Ordering::SeqCst), 1);
        assert_eq!(disconnected.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_error_false_stops_the_loop() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let a = attempts.clone();
        let callbacks: Callbacks<()> = Callbacks::new(move |_ctx, _id, _msg, _params| {
            a.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::internal("boom"))
        })
        .on_error(|_ctx, _id, _err| false);

        let transport: Box<dyn WebSocketTransport> = Box::new(ScriptedTransport {
            messages: vec![WsMessage::Text("a".to_string()), WsMessage::Text("b".to_string())],
            closed: false,
        });

        serve(transport, &(), RequestContext::default(), &[], &callbacks);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_error_true_continues_the_loop() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let a = attempts.clone();
        let callbacks: Callbacks<()> = Callbacks::new(move |_ctx, _id, _msg, _params| {
            a.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::internal("boom"))
        })
        .on_error(|_ctx, _id, _err| true);

        let transport: Box<dyn WebSocketTransport> = Box::new(ScriptedTransport {
            messages: vec![WsMessage::Text("a".to_string()), WsMessage::Text("b".to_string())],
            closed: false,
        });

        serve(transport, &(), RequestContext::default(), &[], &callbacks);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_middleware_runs_once_per_callback() {
        let runs = Arc::new(AtomicUsize::new(0));
        let r = runs.clone();
        let middleware: Vec<Box<dyn WsMiddleware>> = vec![Box::new(move |ctx: RequestContext| {
            r.fetch_add(1, Ordering::SeqCst);
            ctx
        })];
        let callbacks: Callbacks<()> = Callbacks::new(|_ctx, _id, _msg, _params| Ok(()))
            .on_connect(|_ctx, _id, _params| {})
            .on_disconnect(|_ctx, _id, _params, _err| {});

        let transport: Box<dyn WebSocketTransport> = Box::new(ScriptedTransport {
            messages: vec![WsMessage::Text("a".to_string())],
            closed: false,
        });

        serve(transport, &(), RequestContext::default(), &middleware, &callbacks);
        // on_connect + one message iteration + the cleanup pass.
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
