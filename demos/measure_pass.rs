// Example: a host measuring items across layout sessions and keeping its scroll anchor stable.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use item_extents::{Align, ExtentCoordinator, ExtentStore, ItemRange, Viewport, reveal_offset};

// The "real" sizes a renderer would measure.
fn measured(index: usize) -> f64 {
    20.0 + (index % 5) as f64 * 8.0
}

fn main() {
    let mut c = ExtentCoordinator::new(|_: usize| 24.0);
    c.resize(1_000);

    let changes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&changes);
    c.add_observer(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let viewport = 300.0;
    let mut scroll_offset = 0.0;

    for pass in 0..3 {
        c.layout(|s| {
            let first = s.index_for_offset(scroll_offset);
            let last = s.index_for_offset(scroll_offset + viewport);
            for i in first..=last {
                if !s.get_extent(i).confirmed {
                    s.set_extent(i, measured(i));
                }
            }
            s.report_visible_range(Some(ItemRange::new(first, last)));
            scroll_offset *= s.correction_percentage();
        });
        println!(
            "pass {pass}: visible={:?} unconfirmed={} total={} correction={:.3}",
            c.visible_range(),
            c.number_of_items_with_unconfirmed_extent(),
            c.total_extent(),
            c.correction_percentage(),
        );
        scroll_offset += 500.0;
    }

    // Items measured earlier are re-checked after a data change.
    c.invalidate_extent(2);
    let store: &ExtentStore = c.store();
    println!(
        "after invalidation: unconfirmed={} first_unconfirmed={:?} clean={:?}",
        store.dirty_count(),
        store.first_unconfirmed_from(0),
        store.clean_range(),
    );

    let to = reveal_offset(store, 500, Align::Center, Viewport::new(scroll_offset, viewport));
    println!(
        "reveal(500, Center) = {to} (approximate: {})",
        store.has_unconfirmed_through(500)
    );
    println!("observer notifications: {}", changes.load(Ordering::Relaxed));
}
