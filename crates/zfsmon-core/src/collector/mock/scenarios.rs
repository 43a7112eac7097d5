//! Pre-built mock scenarios for testing.
//!
//! These scenarios provide realistic kstat trees and `zfs list` output
//! for exercising a full collection pass.

use super::command::MockCommandRunner;
use super::filesystem::MockFs;
use crate::collector::config::DEFAULT_KSTAT_PATH;

/// `zfs list` command line for the default dataset properties.
pub const TYPICAL_LIST_COMMAND: &str = "zfs list -Hp -o name,avail,used,usedsnap,usedds";

impl MockFs {
    /// Creates a host with two imported pools and a handful of counter files.
    ///
    /// Includes: pools `rpool` and `tank`, plus `arcstats`, `zil`, `dmu_tx`
    /// and `fm`. The remaining default categories are absent, as on older
    /// module versions.
    pub fn typical_host() -> Self {
        let mut fs = Self::new();

        fs.add_pool(
            DEFAULT_KSTAT_PATH,
            "rpool",
            "\
12 3 0x00 1 80 2225326830828 32953917237762
nread    nwritten   reads    writes   wtime    wlentime   wupdate  rtime    rlentime   rupdate  wcnt     rcnt
1884160  3206144    22       37       130737   1765845    32953883 23440    3150211    32953884 0        0
",
        );
        fs.add_pool(
            DEFAULT_KSTAT_PATH,
            "tank",
            "\
12 3 0x00 1 80 2225326830828 32953917237762
nread    nwritten   reads    writes   wtime    wlentime   wupdate  rtime    rlentime   rupdate  wcnt     rcnt
9461760  81920      331      12       44020    1003455    32953886 60133    9812337    32953887 0        1
",
        );

        fs.add_counters(
            DEFAULT_KSTAT_PATH,
            "arcstats",
            "\
6 1 0x01 91 4368 1886271585 29474335538473
name                            type data
hits                            4    5968846
misses                          4    1659178
demand_data_hits                4    4382679
size                            4    2091425920
c_max                           4    8259477504
",
        );
        fs.add_counters(
            DEFAULT_KSTAT_PATH,
            "zil",
            "\
15 1 0x01 13 624 1886379024 29474345627470
name                            type data
zil_commit_count                4    7
zil_commit_writer_count         4    7
zil_itx_count                   4    0
",
        );
        fs.add_counters(
            DEFAULT_KSTAT_PATH,
            "dmu_tx",
            "\
5 1 0x01 11 528 1886253004 29474349036826
name                            type data
dmu_tx_assigned                 4    1426352
dmu_tx_delay                    4    0
dmu_tx_error                    4    0
",
        );
        fs.add_counters(
            DEFAULT_KSTAT_PATH,
            "fm",
            "\
0 1 0x01 4 192 1886225373 29474352098134
name                            type data
erpt-dropped                    4    18
erpt-set-failed                 4    0
fmri-set-failed                 4    0
payload-set-failed              4    0
",
        );

        fs
    }
}

impl MockCommandRunner {
    /// `zfs list` output matching `MockFs::typical_host()`.
    pub fn typical_host() -> Self {
        Self::new().with_output(
            TYPICAL_LIST_COMMAND,
            "\
rpool\t12469432320\t3652665344\t0\t98304
rpool/ROOT\t12469432320\t3650093056\t0\t98304
tank\t971279089664\t1021212672\t0\t24576
tank/backups\t971279089664\t1020911616\t180224\t1020731392
",
        )
    }
}
