pub mod byte_nums;
