//! Registered values and the key types they may stand in for

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// Declares that a value of `Self` may be registered under the key type `K`.
///
/// Every type is a default for itself. To register a concrete type under a
/// trait object key, implement `DefaultFor<dyn Trait>` (the [`default_for!`]
/// macro writes the impl):
///
/// ```
/// use defaults_registry::{default_for, DefaultsRegistry};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// default_for!(English => dyn Greeter);
///
/// let mut registry = DefaultsRegistry::new();
/// registry
///     .configure(|defaults| {
///         defaults.insert_exclusive::<dyn Greeter, _>(English)?;
///         Ok(())
///     })
///     .unwrap();
///
/// let greeter = registry.resolve::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
///
/// `into_key` must return the same allocation it was given, only unsized;
/// every view of an entry resolves to one shared instance.
pub trait DefaultFor<K: ?Sized>: Any + Send + Sync {
    fn into_key(self: Arc<Self>) -> Arc<K>;
}

impl<T: Any + Send + Sync> DefaultFor<T> for T {
    fn into_key(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`DefaultFor`] for a concrete type and one or more trait
/// object keys it implements.
#[macro_export]
macro_rules! default_for {
    ($concrete:ty => $($key:ty),+ $(,)?) => {
        $(
            impl $crate::DefaultFor<$key> for $concrete {
                fn into_key(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$key> {
                    self
                }
            }
        )+
    };
}

struct View {
    type_id: TypeId,
    name: &'static str,
    /// Always an `Arc<T>` for the `T` named by `type_id`
    handle: Box<dyn Any + Send + Sync>,
}

pub(crate) struct Entry {
    key: &'static str,
    concrete: &'static str,
    /// Key view first, then the concrete view, then any declared extras
    views: Vec<View>,
}

impl Entry {
    pub(crate) fn new<K, V>(value: V) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
        V: DefaultFor<K>,
    {
        let concrete = Arc::new(value);
        let mut entry = Self {
            key: type_name::<K>(),
            concrete: type_name::<V>(),
            views: Vec::new(),
        };
        entry.push_view::<K, V>(&concrete);
        entry.push_view::<V, V>(&concrete);
        entry
    }

    /// Let the entry also resolve as `A`. The entry must hold a `V`.
    pub(crate) fn add_view<A, V>(&mut self)
    where
        A: ?Sized + Send + Sync + 'static,
        V: DefaultFor<A>,
    {
        if let Some(concrete) = self.view::<V>() {
            self.push_view::<A, V>(&concrete);
        }
    }

    fn push_view<A, V>(&mut self, concrete: &Arc<V>)
    where
        A: ?Sized + Send + Sync + 'static,
        V: DefaultFor<A>,
    {
        let type_id = TypeId::of::<A>();
        if self.views.iter().any(|view| view.type_id == type_id) {
            return;
        }

        let handle: Arc<A> = <V as DefaultFor<A>>::into_key(Arc::clone(concrete));
        debug_assert!(
            std::ptr::addr_eq(Arc::as_ptr(&handle), Arc::as_ptr(concrete)),
            "DefaultFor<{}> for {} returned a different instance",
            type_name::<A>(),
            type_name::<V>()
        );

        self.views.push(View {
            type_id,
            name: type_name::<A>(),
            handle: Box::new(handle),
        });
    }

    pub(crate) fn key(&self) -> &'static str {
        self.key
    }

    pub(crate) fn concrete(&self) -> &'static str {
        self.concrete
    }

    pub(crate) fn view_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.views.iter().map(|view| view.name)
    }

    pub(crate) fn view<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        let type_id = TypeId::of::<T>();
        self.views
            .iter()
            .find(|view| view.type_id == type_id)
            .and_then(|view| view.handle.downcast_ref::<Arc<T>>())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    #[derive(Debug, PartialEq)]
    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    crate::default_for!(Square => dyn Shape);

    #[test]
    fn test_self_keyed_entry_has_single_view() {
        let entry = Entry::new::<u32, u32>(7);
        assert_eq!(entry.views.len(), 1);
        assert_eq!(*entry.view::<u32>().unwrap(), 7);
        assert!(entry.view::<i32>().is_none());
    }

    #[test]
    fn test_trait_keyed_entry_exposes_key_and_concrete_views() {
        let entry = Entry::new::<dyn Shape, Square>(Square);
        assert_eq!(entry.views.len(), 2);
        assert_eq!(entry.view::<dyn Shape>().unwrap().sides(), 4);
        assert_eq!(*entry.view::<Square>().unwrap(), Square);
        assert!(entry.key().contains("Shape"));
        assert!(entry.concrete().ends_with("Square"));
    }

    #[test]
    fn test_views_share_one_instance() {
        let entry = Entry::new::<dyn Shape, Square>(Square);
        let keyed = entry.view::<dyn Shape>().unwrap();
        let concrete = entry.view::<Square>().unwrap();
        assert!(std::ptr::addr_eq(Arc::as_ptr(&keyed), Arc::as_ptr(&concrete)));
    }

    trait Polygon: Send + Sync {
        fn name(&self) -> &'static str;
    }

    impl Polygon for Square {
        fn name(&self) -> &'static str {
            "square"
        }
    }

    crate::default_for!(Square => dyn Polygon);

    #[test]
    fn test_add_view_declares_extra_trait() {
        let mut entry = Entry::new::<dyn Shape, Square>(Square);
        assert!(entry.view::<dyn Polygon>().is_none());

        entry.add_view::<dyn Polygon, Square>();
        entry.add_view::<dyn Polygon, Square>();

        assert_eq!(entry.views.len(), 3);
        assert_eq!(entry.view::<dyn Polygon>().unwrap().name(), "square");
        let names: Vec<_> = entry.view_names().collect();
        assert!(names[0].contains("Shape"));
        assert!(names[2].contains("Polygon"));
    }

    #[test]
    fn test_add_view_ignores_wrong_concrete_type() {
        let mut entry = Entry::new::<u32, u32>(3);
        entry.add_view::<dyn Shape, Square>();
        assert_eq!(entry.views.len(), 1);
    }

    struct Fresh;

    impl Shape for Fresh {
        fn sides(&self) -> u32 {
            0
        }
    }

    impl DefaultFor<dyn Shape> for Fresh {
        fn into_key(self: Arc<Self>) -> Arc<dyn Shape> {
            Arc::new(Fresh)
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "returned a different instance")]
    fn test_into_key_must_keep_the_instance() {
        let _ = Entry::new::<dyn Shape, Fresh>(Fresh);
    }
}
