use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(any(debug_assertions, feature = "checked"))] {
        /// The arena used by the engine. Debug builds, and builds with the
        /// `checked` feature, verify allocation order on every pop.
        pub type Arena = super::checked_arena::CheckedArena;
    } else {
        /// The arena used by the engine. Release builds only keep a cursor;
        /// enable the `checked` feature to verify allocation order.
        pub type Arena = super::unchecked_arena::UncheckedArena;
    }
}
