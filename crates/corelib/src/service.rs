//! Service capability traits and the typed dispatch table.
//!
//! Dispatch is explicit: a service is anything that can resolve a bare
//! method name to an invokable handler. `ServiceTable` is the provided
//! implementation, built from plain or async closures. Argument conversion
//! and result folding happen at the table boundary so handlers stay typed.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::fault::Fault;
use crate::value::{FromValue, IntoValue, Value};

/// A single invokable method behind a service.
#[async_trait]
pub trait Method: Send + Sync {
    /// Run the method against already-decoded arguments.
    async fn invoke(&self, args: Vec<Value>) -> Result<Value, Fault>;
}

/// Capability interface a service exposes to the dispatcher.
///
/// Resolution happens per call; registering a service never inspects it.
/// Implementations must tolerate concurrent invocation.
pub trait Service: Send + Sync + 'static {
    /// Look up a method by bare name (no service prefix).
    fn resolve(&self, method: &str) -> Option<&dyn Method>;
}

/// Positional conversion of decoded arguments into a typed tuple.
///
/// Arity is checked first, then each position converts through `FromValue`;
/// any failure becomes an argument fault, never a panic.
pub trait FromArguments: Sized {
    fn from_arguments(args: Vec<Value>) -> Result<Self, Fault>;
}

impl FromArguments for () {
    fn from_arguments(args: Vec<Value>) -> Result<Self, Fault> {
        if args.is_empty() {
            Ok(())
        } else {
            Err(Fault::arity(0, args.len()))
        }
    }
}

macro_rules! impl_from_arguments {
    ($len:expr; $($idx:tt => $name:ident),*) => {
        impl<$($name: FromValue),*> FromArguments for ($($name,)*) {
            fn from_arguments(args: Vec<Value>) -> Result<Self, Fault> {
                if args.len() != $len {
                    return Err(Fault::arity($len, args.len()));
                }
                let mut iter = args.into_iter();
                Ok(($(
                    match iter.next() {
                        Some(value) => <$name as FromValue>::from_value(value)
                            .map_err(|err| Fault::argument($idx, err))?,
                        None => return Err(Fault::arity($len, $idx)),
                    },
                )*))
            }
        }
    };
}

impl_from_arguments!(1; 0 => A1);
impl_from_arguments!(2; 0 => A1, 1 => A2);
impl_from_arguments!(3; 0 => A1, 1 => A2, 2 => A3);
impl_from_arguments!(4; 0 => A1, 1 => A2, 2 => A3, 3 => A4);
impl_from_arguments!(5; 0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5);
impl_from_arguments!(6; 0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5, 5 => A6);
impl_from_arguments!(7; 0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5, 5 => A6, 6 => A7);
impl_from_arguments!(8; 0 => A1, 1 => A2, 2 => A3, 3 => A4, 4 => A5, 5 => A6, 6 => A7, 7 => A8);

/// Folding of handler return values into a single wire value.
///
/// One value encodes as itself. A tuple encodes as a `List` in declaration
/// order, which the wire cannot distinguish from a single list-valued
/// result. `()` encodes as `Unit`. `Result` short-circuits: an error becomes
/// the call's fault and any sibling results are discarded.
pub trait IntoReply {
    fn into_reply(self) -> Result<Value, Fault>;
}

impl<T: IntoValue> IntoReply for T {
    fn into_reply(self) -> Result<Value, Fault> {
        Ok(self.into_value())
    }
}

impl<T: IntoReply> IntoReply for Result<T, Fault> {
    fn into_reply(self) -> Result<Value, Fault> {
        self?.into_reply()
    }
}

macro_rules! impl_tuple_reply {
    ($($idx:tt => $name:ident),*) => {
        impl<$($name: IntoValue),*> IntoReply for ($($name,)*) {
            fn into_reply(self) -> Result<Value, Fault> {
                Ok(Value::List(vec![$(self.$idx.into_value()),*]))
            }
        }
    };
}

impl_tuple_reply!(0 => R1, 1 => R2);
impl_tuple_reply!(0 => R1, 1 => R2, 2 => R3);
impl_tuple_reply!(0 => R1, 1 => R2, 2 => R3, 3 => R4);
impl_tuple_reply!(0 => R1, 1 => R2, 2 => R3, 3 => R4, 4 => R5);
impl_tuple_reply!(0 => R1, 1 => R2, 2 => R3, 3 => R4, 4 => R5, 5 => R6);
impl_tuple_reply!(0 => R1, 1 => R2, 2 => R3, 3 => R4, 4 => R5, 5 => R6, 6 => R7);
impl_tuple_reply!(0 => R1, 1 => R2, 2 => R3, 3 => R4, 4 => R5, 5 => R6, 6 => R7, 7 => R8);

/// Plain function usable as a dispatch-table handler.
///
/// Implemented for closures of up to eight `FromValue` parameters returning
/// any `IntoReply` type.
pub trait Handler<A>: Send + Sync + 'static {
    /// Reply type produced by the handler.
    type Reply: IntoReply;

    fn call(&self, args: A) -> Self::Reply;
}

macro_rules! impl_handler {
    ($($name:ident),*) => {
        impl<Func, Rep, $($name,)*> Handler<($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Rep + Send + Sync + 'static,
            Rep: IntoReply,
        {
            type Reply = Rep;

            #[allow(non_snake_case)]
            fn call(&self, ($($name,)*): ($($name,)*)) -> Rep {
                (self)($($name),*)
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Async function usable as a dispatch-table handler.
pub trait AsyncHandler<A>: Send + Sync + 'static {
    /// Reply type produced by the handler.
    type Reply: IntoReply;
    /// Future returned by the handler.
    type Future: Future<Output = Self::Reply> + Send;

    fn call(&self, args: A) -> Self::Future;
}

macro_rules! impl_async_handler {
    ($($name:ident),*) => {
        impl<Func, Fut, Rep, $($name,)*> AsyncHandler<($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Rep> + Send + 'static,
            Rep: IntoReply,
        {
            type Reply = Rep;
            type Future = Fut;

            #[allow(non_snake_case)]
            fn call(&self, ($($name,)*): ($($name,)*)) -> Fut {
                (self)($($name),*)
            }
        }
    };
}

impl_async_handler!();
impl_async_handler!(A1);
impl_async_handler!(A1, A2);
impl_async_handler!(A1, A2, A3);
impl_async_handler!(A1, A2, A3, A4);
impl_async_handler!(A1, A2, A3, A4, A5);
impl_async_handler!(A1, A2, A3, A4, A5, A6);
impl_async_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_async_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

struct SyncMethod<F, A> {
    handler: F,
    _marker: PhantomData<fn(A)>,
}

#[async_trait]
impl<F, A> Method for SyncMethod<F, A>
where
    F: Handler<A>,
    A: FromArguments + Send + 'static,
{
    async fn invoke(&self, args: Vec<Value>) -> Result<Value, Fault> {
        let args = A::from_arguments(args)?;
        self.handler.call(args).into_reply()
    }
}

struct AsyncMethod<F, A> {
    handler: F,
    _marker: PhantomData<fn(A)>,
}

#[async_trait]
impl<F, A> Method for AsyncMethod<F, A>
where
    F: AsyncHandler<A>,
    A: FromArguments + Send + 'static,
{
    async fn invoke(&self, args: Vec<Value>) -> Result<Value, Fault> {
        let args = A::from_arguments(args)?;
        self.handler.call(args).await.into_reply()
    }
}

/// Dispatch table mapping bare method names to handlers.
///
/// The provided `Service` implementation. Registering the same name twice
/// replaces the handler.
///
/// # Example
/// ```
/// use corelib::{Fault, ServiceTable};
///
/// let calculator = ServiceTable::new()
///     .method("Add", |a: i64, b: i64| a + b)
///     .method("Divide", |a: i64, b: i64| {
///         if b == 0 {
///             return Err(Fault::invocation("division by zero"));
///         }
///         Ok(a as f64 / b as f64)
///     });
/// assert_eq!(calculator.len(), 2);
/// ```
pub struct ServiceTable {
    methods: HashMap<String, Box<dyn Method>>,
}

impl ServiceTable {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Register a synchronous handler under `name`.
    pub fn method<F, A>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Handler<A>,
        A: FromArguments + Send + 'static,
    {
        self.methods.insert(
            name.into(),
            Box::new(SyncMethod {
                handler,
                _marker: PhantomData,
            }),
        );
        self
    }

    /// Register an async handler under `name`.
    pub fn async_method<F, A>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: AsyncHandler<A>,
        A: FromArguments + Send + 'static,
    {
        self.methods.insert(
            name.into(),
            Box::new(AsyncMethod {
                handler,
                _marker: PhantomData,
            }),
        );
        self
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// True if no methods are registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for ServiceTable {
    fn resolve(&self, method: &str) -> Option<&dyn Method> {
        self.methods.get(method).map(|boxed| boxed.as_ref())
    }
}

impl fmt::Debug for ServiceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTable")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
