use std::fmt;
use std::str::FromStr;

use crate::DataError;

/// One of the datasets the dashboard can explore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DatasetName {
    /// Fisher's iris flowers, 150 x 4, 3 classes. Bundled.
    Iris,
    /// UCI wine recognition, 178 x 13, 3 classes. Downloaded on first use.
    Wine,
    /// UCI forest cover type, 581012 x 54, 7 classes. Downloaded on first use.
    Covertype,
}

/// Where the label sits in a source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelColumn {
    First,
    Last,
}

/// How a dataset's source file is laid out.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceFormat {
    pub(crate) has_header: bool,
    pub(crate) label_column: LabelColumn,
    pub(crate) feature_names: Option<&'static [&'static str]>,
    pub(crate) class_names: Option<&'static [&'static str]>,
}

const WINE_FEATURES: &[&str] = &[
    "alcohol",
    "malic_acid",
    "ash",
    "alcalinity_of_ash",
    "magnesium",
    "total_phenols",
    "flavanoids",
    "nonflavanoid_phenols",
    "proanthocyanins",
    "color_intensity",
    "hue",
    "od280/od315_of_diluted_wines",
    "proline",
];

const WINE_CLASSES: &[&str] = &["class_0", "class_1", "class_2"];

impl DatasetName {
    /// All datasets in selector order.
    pub const ALL: [DatasetName; 3] = [DatasetName::Iris, DatasetName::Wine, DatasetName::Covertype];

    /// Return the display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetName::Iris => "Iris",
            DatasetName::Wine => "Wine",
            DatasetName::Covertype => "Covertype",
        }
    }

    /// URL of the remote source, `None` for bundled datasets.
    #[must_use]
    pub fn remote_url(self) -> Option<&'static str> {
        match self {
            DatasetName::Iris => None,
            DatasetName::Wine => {
                Some("https://archive.ics.uci.edu/ml/machine-learning-databases/wine/wine.data")
            }
            DatasetName::Covertype => Some(
                "https://archive.ics.uci.edu/ml/machine-learning-databases/covtype/covtype.data.gz",
            ),
        }
    }

    /// File name of the downloaded copy inside the data home.
    #[must_use]
    pub fn cache_file_name(self) -> &'static str {
        match self {
            DatasetName::Iris => "iris.csv",
            DatasetName::Wine => "wine.data",
            DatasetName::Covertype => "covtype.data.gz",
        }
    }

    pub(crate) fn is_gzipped(self) -> bool {
        matches!(self, DatasetName::Covertype)
    }

    pub(crate) fn source_format(self) -> SourceFormat {
        match self {
            DatasetName::Iris => SourceFormat {
                has_header: true,
                label_column: LabelColumn::Last,
                feature_names: None,
                class_names: None,
            },
            DatasetName::Wine => SourceFormat {
                has_header: false,
                label_column: LabelColumn::First,
                feature_names: Some(WINE_FEATURES),
                class_names: Some(WINE_CLASSES),
            },
            DatasetName::Covertype => SourceFormat {
                has_header: false,
                label_column: LabelColumn::Last,
                feature_names: None,
                class_names: None,
            },
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetName {
    type Err = DataError;

    /// Parse a dataset name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DataError::UnknownDataset { name: s.to_string() })
    }
}
