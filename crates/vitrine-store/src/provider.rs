//! # Scoped Cart Provider
//!
//! Makes one [`CartStore`] available to everything running inside
//! [`CartProvider::scope`] on the current thread. Code that reaches for the
//! cart with [`use_cart`] outside any scope gets
//! [`StoreError::OutsideProvider`] instead of a silently fresh cart.
//!
//! ```rust
//! use vitrine_store::{use_cart, CartPersistence, CartProvider, CartStore, MemoryStore};
//! use vitrine_core::Product;
//!
//! let store = CartStore::new(CartPersistence::with_default_key(Box::new(MemoryStore::new())));
//!
//! CartProvider::scope(store, || {
//!     let cart = use_cart().unwrap();
//!     cart.borrow_mut().add_item(&Product::new("mug", "Mug", 1200), 1, None, None);
//!     assert_eq!(cart.borrow().item_count(), 1);
//! });
//!
//! assert!(use_cart().is_err());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::state::CartStore;

/// Handle to the cart of the enclosing provider scope.
pub type SharedCart = Rc<RefCell<CartStore>>;

thread_local! {
    static CURRENT: RefCell<Option<SharedCart>> = const { RefCell::new(None) };
}

pub struct CartProvider;

impl CartProvider {
    /// Runs `f` with `store` installed as the current cart.
    pub fn scope<R>(store: CartStore, f: impl FnOnce() -> R) -> R {
        Self::scope_shared(Rc::new(RefCell::new(store)), f)
    }

    /// Like [`CartProvider::scope`], for a cart the caller keeps a handle to.
    ///
    /// Scopes nest; the previous cart is restored when `f` returns or
    /// unwinds.
    pub fn scope_shared<R>(cart: SharedCart, f: impl FnOnce() -> R) -> R {
        let previous = CURRENT.with(|current| current.replace(Some(cart)));
        let _guard = RestoreOnDrop { previous };
        debug!("cart provider scope entered");
        f()
    }

    /// True when called inside a provider scope.
    pub fn is_active() -> bool {
        CURRENT.with(|current| current.borrow().is_some())
    }
}

/// Returns the cart of the innermost enclosing [`CartProvider`] scope.
pub fn use_cart() -> StoreResult<SharedCart> {
    CURRENT
        .with(|current| current.borrow().clone())
        .ok_or(StoreError::OutsideProvider)
}

struct RestoreOnDrop {
    previous: Option<SharedCart>,
}

impl Drop for RestoreOnDrop {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
        debug!("cart provider scope exited");
    }
}
