pub mod d402_ecommerce_sales;
