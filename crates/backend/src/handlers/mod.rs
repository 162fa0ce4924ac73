pub mod d500_kpi_overview;
