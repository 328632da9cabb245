//! Slot assignment for native imports.
//!
//! Every accepted binding is registered under its (library, condition,
//! symbol name) triple. Bindings sharing a triple share one storage slot and
//! therefore one resolution attempt at run time.

use indexmap::IndexMap;
use natbind_core::SymbolId;
use natbind_ir::{BindingDescriptor, SlotId, TypeHandle};

/// A member importing a slot, for the slot's comment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Importer {
    pub member: SymbolId,
    /// e.g. `uint Demo.Sdl.Init(uint)`.
    pub signature: String,
}

/// One storage slot and the members that import it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolBucket {
    pub slot: SlotId,
    pub symbol_name: String,
    pub importers: Vec<Importer>,
}

/// Slots gated behind one condition type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionGroup {
    pub condition: TypeHandle,
    pub buckets: IndexMap<String, SymbolBucket>,
}

/// Everything imported from one library type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeLibraryGroup {
    pub index: u32,
    pub library: TypeHandle,
    pub unconditional: IndexMap<String, SymbolBucket>,
    pub conditional: IndexMap<SymbolId, ConditionGroup>,
    next_symbol: u32,
}

impl NativeLibraryGroup {
    fn new(index: u32, library: TypeHandle) -> Self {
        Self {
            index,
            library,
            unconditional: IndexMap::new(),
            conditional: IndexMap::new(),
            next_symbol: 0,
        }
    }

    pub fn has_unconditional(&self) -> bool {
        !self.unconditional.is_empty()
    }

    /// Number of distinct slots in this library.
    pub fn slot_count(&self) -> usize {
        self.next_symbol as usize
    }

    /// Buckets in emission order: unconditional first, then each condition group.
    pub fn buckets(&self) -> impl Iterator<Item = (Option<&TypeHandle>, &SymbolBucket)> {
        self.unconditional
            .values()
            .map(|bucket| (None, bucket))
            .chain(self.conditional.values().flat_map(|group| {
                group
                    .buckets
                    .values()
                    .map(move |bucket| (Some(&group.condition), bucket))
            }))
    }

    fn register(&mut self, descriptor: &BindingDescriptor) -> SlotId {
        let Self {
            index,
            unconditional,
            conditional,
            next_symbol,
            ..
        } = self;

        let buckets = match &descriptor.condition {
            None => unconditional,
            Some(condition) => {
                &mut conditional
                    .entry(condition.id)
                    .or_insert_with(|| ConditionGroup {
                        condition: condition.clone(),
                        buckets: IndexMap::new(),
                    })
                    .buckets
            }
        };

        let bucket = buckets
            .entry(descriptor.symbol_name.clone())
            .or_insert_with(|| {
                let slot = SlotId {
                    library: *index,
                    symbol: *next_symbol,
                };
                *next_symbol += 1;
                SymbolBucket {
                    slot,
                    symbol_name: descriptor.symbol_name.clone(),
                    importers: Vec::new(),
                }
            });

        bucket.importers.push(Importer {
            member: descriptor.target.id,
            signature: descriptor.target.signature_display(),
        });
        bucket.slot
    }
}

/// All library groups of one pass, in registration order.
#[derive(Debug, Clone, Default)]
pub struct LibraryGroups {
    libraries: IndexMap<SymbolId, NativeLibraryGroup>,
}

impl LibraryGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accepted binding and return its slot.
    ///
    /// Slot numbers are minted per library in registration order; the first
    /// binding for a triple mints the slot and later ones reuse it.
    pub fn register(&mut self, descriptor: &BindingDescriptor) -> SlotId {
        let next_index = self.libraries.len() as u32;
        let group = self
            .libraries
            .entry(descriptor.library.id)
            .or_insert_with(|| NativeLibraryGroup::new(next_index, descriptor.library.clone()));
        let slot = group.register(descriptor);
        tracing::debug!(
            library = %descriptor.library,
            symbol = %descriptor.symbol_name,
            slot = slot.symbol,
            "registered import"
        );
        slot
    }

    pub fn iter(&self) -> impl Iterator<Item = &NativeLibraryGroup> {
        self.libraries.values()
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Total number of slots across all libraries.
    pub fn slot_count(&self) -> usize {
        self.iter().map(NativeLibraryGroup::slot_count).sum()
    }
}
