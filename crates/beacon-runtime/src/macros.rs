//! Code generation for manageable interfaces.

/// Declare a manageable interface.
///
/// Every method takes `&self` and serde-compatible arguments and returns a
/// serde-compatible value. The generated trait is async and every method
/// returns `Result<T, InvocationError>`, since a call may travel over the
/// network.
///
/// ```rust,ignore
/// beacon_runtime::managed_interface! {
///     /// Greets people.
///     pub trait Hello {
///         fn say_hello(&self, name: String) -> String;
///     }
/// }
/// ```
///
/// Besides the trait, the macro implements
/// [`ManagedInterface`](crate::ManagedInterface) for `dyn Hello` (descriptor,
/// dispatch table, proxy construction) and `Hello` for
/// [`Proxy<dyn Hello>`](crate::Proxy). The interface namespace is the module
/// path of the declaration.
#[macro_export]
macro_rules! managed_interface {
    (
        $(#[$attr:meta])*
        $vis:vis trait $iface:ident {
            $(
                $(#[$method_attr:meta])*
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)* $(,)?) -> $ret:ty;
            )*
        }
    ) => {
        $(#[$attr])*
        #[$crate::__private::async_trait]
        $vis trait $iface: Send + Sync + 'static {
            $(
                $(#[$method_attr])*
                async fn $method(&self $(, $arg: $arg_ty)*)
                    -> ::core::result::Result<$ret, $crate::InvocationError>;
            )*
        }

        impl $crate::ManagedInterface for dyn $iface {
            fn descriptor() -> &'static $crate::__private::InterfaceDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::__private::InterfaceDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::__private::InterfaceDescriptor::new(
                        module_path!(),
                        stringify!($iface),
                        ::std::vec![$(
                            $crate::__private::MethodSignature::new(
                                stringify!($method),
                                ::std::vec![$(
                                    $crate::__private::ParamSpec::new(
                                        stringify!($arg),
                                        $crate::codec::type_label(stringify!($arg_ty)),
                                    )
                                ),*],
                                $crate::codec::type_label(stringify!($ret)),
                            )
                        ),*],
                    )
                })
            }

            fn dispatch<'a>(
                target: &'a Self,
                method: &'a str,
                args: ::std::vec::Vec<$crate::__private::Value>,
            ) -> $crate::__private::BoxFuture<
                'a,
                ::core::result::Result<$crate::__private::Value, $crate::InvocationError>,
            > {
                ::std::boxed::Box::pin(async move {
                    match method {
                        $(
                            stringify!($method) => {
                                #[allow(unused_mut)]
                                let mut args = $crate::codec::Arguments::new(method, args);
                                $(
                                    let $arg: $arg_ty = args.take(stringify!($arg))?;
                                )*
                                args.finish()?;
                                let value = target.$method($($arg),*).await?;
                                $crate::codec::encode_result(method, &value)
                            }
                        )*
                        other => ::core::result::Result::Err(
                            $crate::InvocationError::unknown_method(other),
                        ),
                    }
                })
            }

            fn proxy(handle: $crate::ProxyHandle) -> ::std::sync::Arc<Self> {
                ::std::sync::Arc::new($crate::Proxy::<dyn $iface>::new(handle))
            }
        }

        #[$crate::__private::async_trait]
        impl $iface for $crate::Proxy<dyn $iface> {
            $(
                async fn $method(&self $(, $arg: $arg_ty)*)
                    -> ::core::result::Result<$ret, $crate::InvocationError>
                {
                    let args = ::std::vec![$(
                        $crate::codec::encode_arg(stringify!($arg), &$arg)?
                    ),*];
                    let value = self.handle().call(stringify!($method), args).await?;
                    $crate::codec::decode_result(stringify!($method), value)
                }
            )*
        }
    };
}

/// Declare the manageable interfaces an implementation type exposes.
///
/// `manageable!(HelloImpl: Hello)` lets `HelloImpl` be registered without
/// naming the interface. Listing several interfaces is allowed, but such a
/// type must then be registered with an explicit interface.
#[macro_export]
macro_rules! manageable {
    ($ty:ty : $($iface:ident),* $(,)?) => {
        $(
            impl $crate::Implements<dyn $iface> for $ty {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<dyn $iface> {
                    self
                }
            }
        )*

        impl $crate::Manageable for $ty {
            fn manageable_interfaces() -> ::std::vec::Vec<$crate::InterfaceBinding> {
                ::std::vec![$( $crate::bind::<dyn $iface, $ty>() ),*]
            }
        }
    };
}
