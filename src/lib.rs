pub mod error;

pub mod models {
    pub mod batch;
    pub mod conversion;
    pub mod file;
    pub mod format;
    pub mod html;
}

pub mod config {
    pub mod config;
    pub mod ports;
}

pub mod service {
    pub mod batch;
    pub mod config_service;
    pub mod docx;
    pub mod file;
    pub mod html;
    pub mod image;
    pub mod pdf;
    pub mod registry;
    pub mod rules;
    pub mod text;

    pub mod traits {
        pub mod i_service;
    }
}

pub mod facade {
    pub mod conversion_facade;

    pub mod ports {
        pub mod facade_ports;
    }

    pub mod traits {
        pub mod i_conversion;
    }
}

pub mod action {
    pub mod cli;
    pub mod interactive;
}

pub mod utils {
    pub mod utils;
}
