//! Fuzz target: `KvStore::decode` and profile decoding
//!
//! A corrupted store file must be reported as an error, never panic, and
//! any image that does decode must survive a write/read through the store.
//!
//! cargo fuzz run fuzz_store_decode

#![no_main]

use guardian::adapters::store::KvStore;
use guardian::app::ports::{ProfileStore, StoragePort};
use guardian::profile::{PROFILE_KEY, STORE_NAMESPACE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = KvStore::decode(data);

    // Same bytes as a stored profile value.
    let mut store = KvStore::in_memory();
    if store.write(STORE_NAMESPACE, PROFILE_KEY, data).is_err() {
        return;
    }
    if let Ok(Some(profile)) = store.get(PROFILE_KEY) {
        if store.set(PROFILE_KEY, &profile).is_ok() {
            assert_eq!(store.get(PROFILE_KEY).ok().flatten(), Some(profile));
        }
    }
});
