//! Document-scoped render caches
//!
//! One [`DocumentRenderCache`] lives per open document and memoizes
//! the expensive render-time artifacts keyed by the identity of the
//! document object they derive from: Type 3 glyph caches per font and
//! sampled transfer functions per function definition.
//!
//! Entries hold their keys and values weakly. A hit requires the
//! original key object to still be alive at the same address, so an
//! address reused by a newer object never resurrects a stale entry.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;
use rustc_hash::FxHashMap;

use crate::glyph::{Type3Font, Type3GlyphCache};
use crate::transfer::{TransferDef, TransferFunction};

struct Type3Entry {
  font: Weak<dyn Type3Font>,
  cache: Weak<RefCell<Type3GlyphCache>>,
}

struct TransferEntry {
  def: Weak<TransferDef>,
  func: Weak<TransferFunction>,
}

/// Render caches for one document.
#[derive(Default)]
pub struct DocumentRenderCache {
  type3_caches: FxHashMap<usize, Type3Entry>,
  transfer_funcs: FxHashMap<usize, TransferEntry>,
}

fn key_of<T: ?Sized>(rc: &Rc<T>) -> usize {
  Rc::as_ptr(rc) as *const u8 as usize
}

impl DocumentRenderCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the glyph cache for `font`, creating it on first use.
  /// Never fails; a fresh cache replaces any dead entry.
  pub fn get_type3_cache(&mut self, font: &Rc<dyn Type3Font>) -> Rc<RefCell<Type3GlyphCache>> {
    let key = key_of(font);
    if let Some(entry) = self.type3_caches.get(&key) {
      let same_font = entry
        .font
        .upgrade()
        .is_some_and(|cached| Rc::ptr_eq(&cached, font));
      if same_font {
        if let Some(cache) = entry.cache.upgrade() {
          return cache;
        }
      }
    }
    debug!("creating type3 glyph cache for font at {key:#x}");
    let cache = Rc::new(RefCell::new(Type3GlyphCache::new(font)));
    self.type3_caches.insert(
      key,
      Type3Entry {
        font: Rc::downgrade(font),
        cache: Rc::downgrade(&cache),
      },
    );
    cache
  }

  /// Returns the sampled transfer function for `def`, building it on
  /// first use. A failed build is not cached and will be retried.
  pub fn get_transfer_function(&mut self, def: &Rc<TransferDef>) -> Option<Rc<TransferFunction>> {
    let key = key_of(def);
    if let Some(entry) = self.transfer_funcs.get(&key) {
      let same_def = entry
        .def
        .upgrade()
        .is_some_and(|cached| Rc::ptr_eq(&cached, def));
      if same_def {
        if let Some(func) = entry.func.upgrade() {
          return Some(func);
        }
      }
    }
    let func = Rc::new(TransferFunction::build(def)?);
    self.transfer_funcs.insert(
      key,
      TransferEntry {
        def: Rc::downgrade(def),
        func: Rc::downgrade(&func),
      },
    );
    Some(func)
  }

  /// Drops entries whose cached value has been released.
  pub fn purge_dead(&mut self) {
    self
      .type3_caches
      .retain(|_, entry| entry.cache.strong_count() > 0);
    self
      .transfer_funcs
      .retain(|_, entry| entry.func.strong_count() > 0);
  }
}
