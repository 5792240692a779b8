#[allow(unused_imports)]
use crate::TypeConfig;

/// Define types for a Raft type configuration.
///
/// Since Rust has some limitations when deriving traits for types with generic
/// arguments and most types are parameterized by [`TypeConfig`], we need to
/// add supertraits to a type implementing [`TypeConfig`].
///
/// This macro does exactly that.
///
/// Example:
/// ```ignore
/// raftpeer::declare_raft_types!(
///    pub TypeConfig:
///        AppData      = ClientRequest,
///        Responder    = raftpeer::impls::OneshotResponder<TypeConfig>,
/// );
/// ```
///
/// Types can be omitted, and the following default type will be used:
/// - `AppData`:      `String`
/// - `Responder`:    `::raftpeer::impls::OneshotResponder<Self>`
///
/// Or just use the default type config:
/// ```ignore
/// raftpeer::declare_raft_types!(pub TypeConfig);
/// ```
#[macro_export]
macro_rules! declare_raft_types {
    // Add a trailing colon to    `declare_raft_types(MyType)`,
    // Make it the standard form: `declare_raft_types(MyType:)`.
    ($(#[$outer:meta])* $visibility:vis $id:ident) => {
        $crate::declare_raft_types!($(#[$outer])* $visibility $id:);
    };

    // The main entry of this macro
    ($(#[$outer:meta])* $visibility:vis $id:ident: $($(#[$inner:meta])* $type_id:ident = $type:ty),* $(,)? ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
        $visibility struct $id {}

        impl $crate::TypeConfig for $id {
            // `expand!(KEYED, ...)` ignores the duplicates.
            // Thus by appending default types after user defined types,
            // the absent user defined types are filled with default types.
            $crate::openraft_macros::expand!(
                KEYED,
                (T, ATTR, V) => {ATTR type T = V;},
                $(($type_id, $(#[$inner])*, $type),)*

                // Default types:
                (AppData      , , String                           ),
                (Responder    , , $crate::impls::OneshotResponder<Self> ),
            );

        }
    };
}
