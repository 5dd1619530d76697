use std::time::Instant;

use crate::model::{Item, ItemKind};
use crate::selectable_list::SelectableList;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn warm_filter_p95_under_50ms() {
    let mut items: Vec<Item> = (0..10_000)
        .map(|i| Item::new(format!("Document {i:05}"), ItemKind::Application))
        .collect();
    items.push(Item::new("Quarterly Report", ItemKind::Command));
    let mut list = SelectableList::new("Home", items);

    for _ in 0..10 {
        list.set_query("report");
    }
    assert_eq!(list.filtered_labels(), vec!["Quarterly Report"]);

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(40);
        for round in 0..40 {
            let query = if round % 2 == 0 { "docu" } else { "report" };
            let start = Instant::now();
            list.set_query(query);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 50.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 50.0ms); batches={batch_p95:?}",
    );
}
