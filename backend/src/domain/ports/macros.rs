//! `define_port_error!` builds thiserror enums for adapter failures, plus a
//! snake_case constructor per variant whose fields take `impl Into<T>`.

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
    //! Regression coverage for this module.
    use uuid::Uuid;

    define_port_error! {
        pub enum LedgerPortError {
            Unreachable { message: String } => "ledger unreachable: {message}",
            Stale { expected: u32 } => "stale revision {expected}",
            Taken { commission_id: Uuid, message: String } => "{commission_id}: {message}",
            Closed => "ledger closed",
        }
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        assert_eq!(
            LedgerPortError::unreachable("pool exhausted").to_string(),
            "ledger unreachable: pool exhausted"
        );
    }

    #[test]
    fn copy_fields_keep_their_type() {
        assert_eq!(LedgerPortError::stale(7_u32), LedgerPortError::Stale { expected: 7 });
    }

    #[test]
    fn mixed_and_unit_variants_get_constructors() {
        let id = Uuid::nil();
        assert_eq!(
            LedgerPortError::taken(id, "bid exists").to_string(),
            format!("{id}: bid exists")
        );
        assert_eq!(LedgerPortError::closed(), LedgerPortError::Closed);
    }
}
