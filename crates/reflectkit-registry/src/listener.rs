//! Mutation observation.
//!
//! Every successful property mutation and method invocation under a
//! [`DefinitionManager`](crate::DefinitionManager) is reported to its
//! registered listeners - synchronously, exactly once, after the mutation
//! has taken effect (post hooks) with a matching pre hook before it. This
//! is the attachment point for undo/redo recording and live UI refresh;
//! the reflection core itself implements neither.
//!
//! Dispatch is copy-then-iterate: the subscriber list is snapshotted
//! before the pre hooks fire, so listeners may register or deregister
//! other listeners - or trigger further mutations - from inside a
//! callback.

use reflectkit_core::{CollectionKey, Variant};

use crate::property::MethodParameters;
use crate::property_accessor::PropertyAccessor;

/// Observer for property access and definition shape changes.
///
/// All hooks default to no-ops; implementors override what they need.
#[allow(unused_variables)]
pub trait PropertyAccessorListener: Send + Sync {
    /// A value is about to be written. The accessor still reads the old
    /// value at this point.
    fn pre_set_value(&self, accessor: &PropertyAccessor, value: &Variant) {}

    /// A value was written; `value` is the post-set value.
    fn post_set_value(&self, accessor: &PropertyAccessor, value: &Variant) {}

    /// A method is about to be invoked.
    fn pre_invoke(&self, accessor: &PropertyAccessor, parameters: &MethodParameters) {}

    /// A method was invoked.
    fn post_invoke(&self, accessor: &PropertyAccessor, result: &Variant) {}

    /// A collection element is about to be inserted.
    fn pre_insert(&self, accessor: &PropertyAccessor, key: &CollectionKey, count: usize) {}

    /// A collection element was inserted.
    fn post_inserted(&self, accessor: &PropertyAccessor, key: &CollectionKey, count: usize) {}

    /// A collection element is about to be erased. The element is still
    /// readable at this point.
    fn pre_erase(&self, accessor: &PropertyAccessor, key: &CollectionKey, count: usize) {}

    /// A collection element was erased.
    fn post_erased(&self, accessor: &PropertyAccessor, key: &CollectionKey, count: usize) {}

    /// A generic definition is about to gain a property.
    fn pre_property_added(&self, definition: &str, property: &str) {}

    /// A generic definition gained a property.
    fn post_property_added(&self, definition: &str, property: &str) {}

    /// A generic definition is about to lose a property. The property and
    /// its values are still readable at this point.
    fn pre_property_removed(&self, definition: &str, property: &str) {}

    /// A generic definition lost a property.
    fn post_property_removed(&self, definition: &str, property: &str) {}
}
