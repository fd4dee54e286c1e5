//! Macro generating the error enums driven ports return.
//!
//! Repository ports share two failure modes, an unreachable store and a
//! failed query. The `store` form adds those two variants plus a `STORE`
//! label naming the repository in messages and logs; port-specific variants
//! follow in the braces. The plain form declares exactly the listed variants.
//! Either way each variant gets a snake_case constructor whose field
//! parameters take `impl Into<T>`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident : store $store:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// The store could not be reached.
            #[error("{store} connection failed: {message}", store = $store)]
            Connection { message: String },
            /// A query or mutation failed while executing.
            #[error("{store} query failed: {message}", store = $store)]
            Query { message: String },
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            /// Label naming the store in messages and logs.
            pub const STORE: &'static str = $store;

            define_port_error!(@ctor Connection { message: String });
            define_port_error!(@ctor Query { message: String });
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum LockerRepositoryError: store "locker repository" {
            Occupied { locker: String, holder: String } => "locker {locker} is held by {holder}",
        }
    }

    define_port_error! {
        pub enum ScannerError {
            Jammed => "scanner jammed",
            Misread { attempts: u32 } => "misread after {attempts} attempts",
        }
    }

    #[rstest]
    fn store_form_adds_connection_and_query_variants() {
        assert_eq!(
            LockerRepositoryError::connection("refused").to_string(),
            "locker repository connection failed: refused"
        );
        assert_eq!(
            LockerRepositoryError::query("syntax").to_string(),
            "locker repository query failed: syntax"
        );
        assert_eq!(LockerRepositoryError::STORE, "locker repository");
    }

    #[rstest]
    fn store_form_keeps_port_specific_variants() {
        let err = LockerRepositoryError::occupied("B12", "ada");

        assert_eq!(err.to_string(), "locker B12 is held by ada");
    }

    #[rstest]
    #[case(ScannerError::jammed(), "scanner jammed")]
    #[case(ScannerError::misread(3_u32), "misread after 3 attempts")]
    fn plain_form_declares_only_listed_variants(#[case] err: ScannerError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }
}
