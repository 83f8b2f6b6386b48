/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

use crate::model::job::{HostSet, HostSetOps};
use crate::scheduler::cluster::ClusterState;

#[test]
fn allocate_picks_smallest_ids() {
    let mut cluster = ClusterState::new(4);
    assert_eq!(cluster.free_count(), 4);

    let hosts = cluster.allocate("a", 2, 10.0);
    assert_eq!(hosts, HostSet::from_iter([0, 1]));
    assert_eq!(cluster.free_count(), 2);

    let hosts = cluster.allocate("b", 1, 20.0);
    assert_eq!(hosts, HostSet::from_iter([2]));
    assert!(cluster.is_running("a"));
    assert!(!cluster.is_running("c"));
}

#[test]
fn release_returns_hosts_for_reuse() {
    let mut cluster = ClusterState::new(4);
    cluster.allocate("a", 2, 10.0);
    cluster.allocate("b", 2, 20.0);

    assert!(cluster.release("a"));
    assert_eq!(cluster.free_count(), 2);
    assert!(!cluster.is_running("a"));

    let hosts = cluster.allocate("c", 1, 30.0);
    assert_eq!(hosts, HostSet::from_iter([0]));

    // A second release of the same id is a no-op
    assert!(!cluster.release("a"));
}

#[test]
fn allocate_spans_fragmented_free_ranges() {
    let mut cluster = ClusterState::new(8);
    cluster.allocate("a", 4, 10.0); // 0..=3
    cluster.allocate("b", 2, 20.0); // 4..=5
    cluster.release("a"); // free: 0..=3, 6..=7
    cluster.allocate("c", 2, 30.0); // 0..=1

    let hosts = cluster.allocate("d", 4, 40.0);
    assert_eq!(hosts, HostSet::from_iter([2, 3, 6, 7]));
    assert_eq!(cluster.free_count(), 0);
}

#[test]
fn iter_running_reports_projections() {
    let mut cluster = ClusterState::new(4);
    cluster.allocate("a", 1, 10.0);
    cluster.allocate("b", 2, 5.0);

    let mut running: Vec<(String, f64, u32)> = cluster
        .iter_running()
        .map(|(job_id, end_time, nb_hosts)| (job_id.to_string(), end_time, nb_hosts))
        .collect();
    running.sort_by(|x, y| x.0.cmp(&y.0));
    assert_eq!(running, vec![("a".to_string(), 10.0, 1), ("b".to_string(), 5.0, 2)]);
}

#[test]
fn format_csv_lists_ascending_ids() {
    assert_eq!(HostSet::from_iter([3, 0, 1]).format_csv(), "0,1,3");
    assert_eq!(HostSet::from_iter([7]).format_csv(), "7");
    assert_eq!(HostSet::new().format_csv(), "");
}

#[test]
fn sub_host_set_leaves_receiver_untouched() {
    let free = HostSet::from_iter([0, 1, 5, 6, 7]);
    assert_eq!(free.sub_host_set(3), Some(HostSet::from_iter([0, 1, 5])));
    assert_eq!(free.host_count(), 5);
    assert_eq!(free.sub_host_set(6), None);
}

#[test]
#[should_panic(expected = "allocation underflow")]
fn allocate_underflow_asserts() {
    let mut cluster = ClusterState::new(2);
    cluster.allocate("a", 3, 1.0);
}
